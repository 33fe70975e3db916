pub mod run_id;

pub use run_id::{make_span_with_run_id, run_id_middleware, RunId, RUN_ID_HEADER};

use minijinja::{context, Environment};
use std::path::{Path, PathBuf};

use crate::{error::AppResult, models::RecommendationReport};

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ report.username }} · {{ report.season }} {{ report.year }}</title>
<style>
  body { font-family: sans-serif; margin: 2rem; }
  table { border-collapse: collapse; }
  th, td { border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }
  td.num { text-align: right; }
</style>
</head>
<body>
<h1>Recommendations for {{ report.username }}</h1>
<p>{{ report.season }} {{ report.year }} · trained on {{ report.training_entries }} rated titles · run {{ report.run_id }}</p>
{% if report.recommendations %}
<table>
  <thead>
    <tr><th>#</th><th>Image</th><th>Title</th><th>Score</th><th>Community</th></tr>
  </thead>
  <tbody>
  {% for rec in report.recommendations %}
    <tr>
      <td class="num">{{ rec.rank }}</td>
      <td>{% if rec.image %}<img src="{{ rec.image }}" width="60">{% endif %}</td>
      <td>{% if rec.url %}<a href="{{ rec.url }}">{{ rec.title }}</a>{% else %}{{ rec.title }}{% endif %}</td>
      <td class="num">{{ rec.predicted }}</td>
      <td class="num">{% if rec.community_score is none %}-{% else %}{{ rec.community_score }}{% endif %}</td>
    </tr>
  {% endfor %}
  </tbody>
</table>
{% else %}
<p>No unwatched titles passed the filters.</p>
{% endif %}
</body>
</html>
"#;

/// Renders the ranked list as a standalone HTML page
pub fn render_report(report: &RecommendationReport) -> AppResult<String> {
    let mut env = Environment::new();
    env.add_template("report.html", REPORT_TEMPLATE)?;
    let template = env.get_template("report.html")?;
    Ok(template.render(context! { report => report })?)
}

/// `<username>_<SEASON>_<year>.html`, with anything unsafe in the username replaced
pub fn report_file_name(report: &RecommendationReport) -> String {
    let username: String = report
        .username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}_{}.html", username, report.season, report.year)
}

/// Writes a rendered report into `dir`, creating the directory if needed
pub async fn write_report(
    dir: &Path,
    report: &RecommendationReport,
    html: &str,
) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_file_name(report));
    tokio::fs::write(&path, html).await?;

    tracing::info!(
        run_id = %report.run_id,
        path = %path.display(),
        "Report written"
    );

    Ok(path)
}

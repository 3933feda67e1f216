//! HTML for the public job pages.

use axum::http::StatusCode;

use crate::dto::job_dto::JobView;
use crate::utils::html::escape;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn job_list_page(jobs: &[JobView]) -> String {
    let mut body = String::from("<h1>今日开放职位</h1>\n");
    if jobs.is_empty() {
        body.push_str("<p>暂时没有开放的职位。</p>\n");
    } else {
        body.push_str("<ul>\n");
        for job in jobs {
            body.push_str(&format!(
                "<li>{} · <a href=\"/job/{}/\">{}</a> · {}</li>\n",
                escape(&job.job_type),
                job.id,
                escape(&job.job_name),
                escape(&job.city_name)
            ));
        }
        body.push_str("</ul>\n");
    }
    page("职位列表", &body)
}

pub fn job_detail_page(job: &JobView) -> String {
    let body = format!(
        "<h1>{name}</h1>\n<dl>\n<dt>职位类别</dt><dd>{job_type}</dd>\n<dt>工作地点</dt><dd>{city}</dd>\n<dt>职位职责</dt><dd><pre>{responsibility}</pre></dd>\n<dt>职位要求</dt><dd><pre>{requirement}</pre></dd>\n</dl>\n<p><a href=\"/joblist/\">返回职位列表</a></p>\n",
        name = escape(&job.job_name),
        job_type = escape(&job.job_type),
        city = escape(&job.city_name),
        responsibility = escape(&job.job_responsibility),
        requirement = escape(&job.job_requirement),
    );
    page(&job.job_name, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{} {}</h1>\n<p>{}</p>\n",
        status.as_u16(),
        escape(reason),
        escape(message)
    );
    page(reason, &body)
}

use crate::i18n::{t, t_with, Locale};
use crate::services::result_presenter::{CategoryContent, Chips, ResultView};

/// 页面状态
///
/// 每次请求单独构建，渲染时只读
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub locale: Locale,
    pub max_files: usize,
    /// 本次提交的文件名
    pub selected_files: Vec<String>,
    /// 显示在表单旁的错误提示
    pub error: Option<String>,
    pub result: Option<ResultView>,
}

/// 渲染上传页面，有结果时附带结果区域
pub fn render_page(view: &PageView) -> String {
    let locale = view.locale;
    let max = view.max_files.to_string();

    let selected = if view.selected_files.is_empty() {
        String::new()
    } else {
        let items: String = view
            .selected_files
            .iter()
            .map(|name| format!("<li>{}</li>", html_escape(name)))
            .collect();
        format!(
            r#"<p class="selected-title">{}</p><ul class="selected">{items}</ul>"#,
            html_escape(&t_with(
                locale,
                "selectedFiles",
                &[("count", view.selected_files.len().to_string())]
            ))
        )
    };

    let error = view
        .error
        .as_deref()
        .map(|e| format!(r#"<p class="error">{}</p>"#, html_escape(e)))
        .unwrap_or_default();

    let result = view
        .result
        .as_ref()
        .map(|r| render_result(r, locale))
        .unwrap_or_default();

    let content = format!(
        r#"
<div class="container">
<p class="subtitle">{subtitle}</p>
<form class="card" method="post" action="/analyze?lang={lang}" enctype="multipart/form-data">
    <label class="file-label">{select}<input type="file" name="file" multiple></label>
    <p class="hint">{hint}</p>
    {selected}
    {error}
    <button type="submit" onclick="this.textContent='{processing}'">{submit}</button>
</form>
{result}
</div>
"#,
        subtitle = html_escape(&t(locale, "systemSubtitle")),
        lang = locale.code(),
        select = html_escape(&t(locale, "selectFiles")),
        hint = html_escape(&t_with(locale, "supportFormats", &[("max", max)])),
        processing = html_escape(&t(locale, "processing")),
        submit = html_escape(&t(locale, "uploadAnalyze")),
    );

    build_page(locale, &content)
}

/// 把工作流结果渲染为标签组，无法解析时显示原始文本
pub fn render_result(view: &ResultView, locale: Locale) -> String {
    match view {
        ResultView::Empty => String::new(),
        ResultView::Raw(text) => format!(
            r#"<div class="card result"><h2>{}</h2><pre class="raw">{}</pre></div>"#,
            html_escape(&t(locale, "rawResultTitle")),
            html_escape(text)
        ),
        ResultView::Tags(tags) => format!(
            r#"<div class="card result"><h2>{}</h2>{}</div>"#,
            html_escape(&t(locale, "resultTitle")),
            render_chips(&Chips::Tags(tags.clone()))
        ),
        ResultView::Categories(categories) => {
            let mut sections = String::new();
            for category in categories {
                let body = match &category.content {
                    CategoryContent::Groups(groups) => groups
                        .iter()
                        .map(|group| {
                            format!(
                                r#"<div class="tag-group"><p class="label">{}</p>{}</div>"#,
                                html_escape(&group.label),
                                render_chips(&group.chips)
                            )
                        })
                        .collect::<String>(),
                    CategoryContent::Chips(chips) => render_chips(chips),
                };
                sections.push_str(&format!(
                    r#"<section class="category"><h3>{}</h3>{}</section>"#,
                    html_escape(&category.name),
                    body
                ));
            }
            format!(
                r#"<div class="card result"><h2>{}</h2>{}</div>"#,
                html_escape(&t(locale, "resultTitle")),
                sections
            )
        }
    }
}

fn render_chips(chips: &Chips) -> String {
    match chips {
        Chips::Tags(tags) => {
            let spans: String = tags
                .iter()
                .map(|tag| format!(r#"<span class="tag">{}</span>"#, html_escape(tag)))
                .collect();
            format!(r#"<div class="tags">{spans}</div>"#)
        }
        Chips::Text(text) => format!(
            r#"<div class="tags"><span class="tag tag-text">{}</span></div>"#,
            html_escape(text)
        ),
    }
}

fn build_page(locale: Locale, content: &str) -> String {
    let switcher: String = [Locale::Zh, Locale::En]
        .iter()
        .map(|l| {
            if *l == locale {
                format!(r#"<span class="current">{}</span>"#, l.label())
            } else {
                format!(r#"<a href="/?lang={}">{}</a>"#, l.code(), l.label())
            }
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#f5f7fa;}}
.header{{background:#1a1a1a;color:#fff;padding:12px 24px;display:flex;align-items:center;justify-content:space-between;}}
.header h1{{font-size:18px;font-weight:600;}}
.header nav a,.header nav span{{color:#ccc;text-decoration:none;margin-left:16px;font-size:14px;}}
.header nav .current{{color:#fff;font-weight:600;}}
.container{{max-width:720px;margin:0 auto;padding:24px;}}
.subtitle{{color:#555;margin-bottom:16px;}}
.card{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:24px;margin-bottom:24px;}}
.file-label{{display:block;font-weight:500;margin-bottom:8px;}}
.file-label input{{display:block;margin-top:8px;width:100%;}}
.hint{{font-size:13px;color:#888;margin-bottom:8px;}}
.selected-title{{font-size:13px;color:#333;}}
.selected{{padding-left:20px;font-size:13px;color:#555;margin-bottom:8px;}}
.error{{color:#c62828;font-size:13px;margin-bottom:8px;}}
button{{padding:8px 16px;background:#2563eb;color:#fff;border:none;border-radius:4px;cursor:pointer;}}
.result h2{{font-size:20px;margin-bottom:16px;}}
.category{{margin-bottom:20px;}}
.category h3{{font-size:16px;margin-bottom:8px;}}
.tag-group{{margin-bottom:12px;}}
.tag-group .label{{font-weight:500;margin-bottom:4px;}}
.tags{{display:flex;flex-wrap:wrap;gap:8px;}}
.tag{{display:inline-block;background:#3b82f6;color:#fff;font-size:12px;padding:2px 8px;border-radius:4px;}}
.tag-text{{background:#e5e7eb;color:#374151;}}
.raw{{background:#f3f4f6;padding:16px;border-radius:4px;white-space:pre-wrap;word-break:break-all;}}
</style>
</head>
<body>
<div class="header"><h1>{title}</h1><nav>{switcher}</nav></div>
{content}
</body>
</html>"#,
        lang = locale.code(),
        title = html_escape(&t(locale, "systemTitle")),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

use crate::config::Config;
use crate::controller::{Availability, Outcome, Tab, ViewState, SUCCESS_MESSAGE};
use crate::direction::Direction;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1200px; padding: 1.5rem; }
nav a { margin-right: 1rem; padding: .4rem .8rem; text-decoration: none; border-bottom: 2px solid transparent; }
nav a.active { border-bottom-color: #ff4b4b; font-weight: 600; }
textarea { width: 100%; box-sizing: border-box; font-size: 1rem; padding: .5rem; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
.controls button { min-width: 8rem; margin-right: .5rem; padding: .4rem; }
.notice { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.success { background: #e6f4ea; color: #1e4620; }
.warning { background: #fff8e1; color: #6d4c00; }
.error { background: #fdecea; color: #611a15; }
[dir=rtl] { text-align: right; }
"#;

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn text_dir(language: &str) -> &'static str {
    if language == "ar" { "rtl" } else { "ltr" }
}

/// Render the full page for a view state
pub fn render_page(view: &ViewState, config: &Config) -> String {
    let title = escape_html(&config.ui.page_title);
    let body = match view.tab {
        Tab::Translate => render_translate_tab(view),
        Tab::Info => render_info_tab(config),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>🌐 {title}</h1>\n<form method=\"post\" action=\"/\">\n{selector}\n{tabs}\n<main>\n{body}\n</main>\n</form>\n</body>\n</html>\n",
        title = title,
        style = STYLE,
        selector = render_direction_selector(view.direction, view.tab),
        tabs = render_tabs(view),
        body = body,
    )
}

fn tab_href(direction: Direction, tab: Tab) -> String {
    let tab = match tab {
        Tab::Translate => "translate",
        Tab::Info => "info",
    };
    format!("/?direction={}&amp;tab={}", direction.code(), tab)
}

// Switching posts the whole page form so the draft text travels with it
fn render_direction_selector(selected: Direction, tab: Tab) -> String {
    let mut html = String::from("<fieldset>\n<legend>Select translation direction:</legend>\n");

    for direction in Direction::ALL {
        let checked = if direction == selected { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"radio\" name=\"direction\" value=\"{}\"{} \
             onchange=\"this.form.requestSubmit(document.getElementById('switch_direction'))\"> {}</label>\n",
            direction.code(),
            checked,
            direction.display_name(),
        ));
    }

    let tab_value = match tab {
        Tab::Translate => "translate",
        Tab::Info => "info",
    };
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"tab\" value=\"{}\">\n\
         <button type=\"submit\" id=\"switch_direction\" name=\"action\" value=\"select\">Switch</button>\n</fieldset>",
        tab_value
    ));
    html
}

fn render_tabs(view: &ViewState) -> String {
    let class = |tab: Tab| if view.tab == tab { " class=\"active\"" } else { "" };
    format!(
        "<nav>\n<a href=\"{}\"{}>Translation</a>\n<a href=\"{}\"{}>System Information</a>\n</nav>",
        tab_href(view.direction, Tab::Translate),
        class(Tab::Translate),
        tab_href(view.direction, Tab::Info),
        class(Tab::Info),
    )
}

fn render_translate_tab(view: &ViewState) -> String {
    let mut html = String::new();

    if let Availability::Unavailable(message) = &view.availability {
        html.push_str(&format!(
            "<div class=\"notice error\"><strong>Could not load the translation model.</strong> {}<br>\
             <a href=\"{}\">Retry loading</a></div>\n",
            escape_html(message),
            tab_href(view.direction, Tab::Translate),
        ));
    }

    let disabled = if view.can_translate() { "" } else { " disabled" };
    html.push_str(&format!(
        "<h3>Enter {label}</h3>\n\
         <textarea name=\"text\" id=\"input_text\" rows=\"6\" dir=\"{dir}\" placeholder=\"Enter text to translate...\">{input}</textarea>\n\
         <div class=\"controls\">\n\
         <button type=\"submit\" name=\"action\" value=\"translate\"{disabled}>Translate</button>\n\
         <button type=\"submit\" name=\"action\" value=\"clear\">Clear</button>\n\
         </div>\n",
        label = view.input_label(),
        dir = text_dir(view.direction.source_language()),
        input = escape_html(&view.input),
        disabled = disabled,
    ));

    match &view.outcome {
        Outcome::Idle => {}
        Outcome::Warning(message) => {
            html.push_str(&format!("<div class=\"notice warning\">{}</div>\n", escape_html(message)));
        }
        Outcome::Failed(message) => {
            html.push_str(&format!("<div class=\"notice error\">{}</div>\n", escape_html(message)));
        }
        Outcome::Translated(translation) => {
            html.push_str(&format!(
                "<div class=\"notice success\">{success}</div>\n\
                 <div class=\"columns\">\n\
                 <section>\n<h3>{input_label}</h3>\n\
                 <textarea id=\"original_text\" readonly>{original}</textarea>\n</section>\n\
                 <section>\n<h3>{output_label}</h3>\n\
                 <textarea id=\"translated_text\" readonly>{translated}</textarea>\n</section>\n\
                 </div>\n\
                 <details>\n<summary>Translation Details</summary>\n\
                 <p><strong>Processing time:</strong> {elapsed}</p>\n\
                 <p><strong>Cleaned input text:</strong> {cleaned}</p>\n\
                 </details>\n",
                success = SUCCESS_MESSAGE,
                input_label = view.input_label(),
                original = escape_html(&translation.result.original),
                output_label = view.output_label(),
                translated = escape_html(&translation.result.translated),
                elapsed = translation.elapsed_display(),
                cleaned = escape_html(&translation.result.cleaned),
            ));
        }
    }

    html
}

fn render_info_tab(config: &Config) -> String {
    let models = &config.pipeline.models;
    format!(
        "<h2>System Information</h2>\n\
         <h3>About This Application</h3>\n\
         <p>This bilingual translation system provides high-quality translations between Arabic and English. \
         It utilizes state-of-the-art machine learning models fine-tuned on extensive language datasets.</p>\n\
         <h3>Technical Specifications</h3>\n\
         <ul>\n\
         <li><strong>Arabic to English model:</strong> {ar_en}</li>\n\
         <li><strong>English to Arabic model:</strong> {en_ar}</li>\n\
         <li><strong>Translation Directions:</strong> Arabic ↔ English</li>\n\
         <li><strong>Text Processing:</strong> Advanced cleaning and normalization</li>\n\
         <li><strong>Performance:</strong> Models are loaded once per direction and kept warm</li>\n\
         </ul>\n\
         <h3>Usage Instructions</h3>\n\
         <ol>\n\
         <li>Select translation direction</li>\n\
         <li>Enter text in the input box</li>\n\
         <li>Click the Translate button</li>\n\
         <li>View results in the output section</li>\n\
         </ol>\n",
        ar_en = escape_html(models.for_direction(Direction::ArEn)),
        en_ar = escape_html(models.for_direction(Direction::EnAr)),
    )
}

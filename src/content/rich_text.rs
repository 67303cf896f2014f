use crate::content::ContentError;

/// GitHub-flavored markdown to HTML. Author-written HTML passes through
/// unescaped.
pub fn render_markdown(body: &str) -> Result<String, ContentError> {
    let mut options = markdown::Options::gfm();
    options.compile.allow_dangerous_html = true;
    options.compile.allow_dangerous_protocol = true;
    markdown::to_html_with_options(body, &options)
        .map_err(|message| ContentError::Markdown(message.to_string()))
}

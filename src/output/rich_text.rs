use crate::content::render_markdown;
use tracing::warn;
use yew::{html, Html};

/// Already rendered markup, inserted as is.
pub fn rich_text_html(rendered: &str) -> Html {
    Html::from_html_unchecked(rendered.to_owned().into())
}

/// Markdown from configuration. Falls back to plain lines if it can't be
/// rendered.
pub fn markdown_html(text: &str) -> Html {
    match render_markdown(text) {
        Ok(rendered) => rich_text_html(&rendered),
        Err(e) => {
            warn!("showing markdown as plain text: {e}");
            text.lines()
                .map(|line| {
                    html! {<>
                        {line}
                        <br/>
                    </>}
                })
                .collect()
        }
    }
}

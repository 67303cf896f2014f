use crate::{
    config::SiteConfig,
    output::{write_structured_data, PersonStructuredData, WebSiteStructuredData},
    util::join,
};
use tracing::warn;
use yew::{function_component, html, AttrValue, Html, LocalServerRenderer, Properties};

pub struct AppProps<'a> {
    pub config: &'a SiteConfig,
    /// Location of this page, e.g. `/?post=hello`.
    pub canonical: String,
    pub title: AttrValue,
    pub description: Option<AttrValue>,
    pub og_image: Option<String>,
    pub head: Html,
    /// Profile and section navigation.
    pub header: Html,
    pub body: Html,
}

pub fn app(props: AppProps<'_>) -> Html {
    let style = Html::from_html_unchecked(
        r#"
        :root {
            --accent: #3b5bdb;
            --muted: #5c5f66;
        }

        html {
            font-size: calc(8px + 0.6vw);
        }

        body {
            background-color: #f4f4f2;
            margin: 2rem;
            font-family: "Helvetica Neue", "Lucida Grande", Arial, Helvetica, sans-serif;
            color: #1a1b1e;
        }

        h1, h2, h3 {
            font-family: Georgia, "Times New Roman", serif;
            font-weight: normal;
        }

        a {
            color: var(--accent);
            text-decoration: none;
        }

        p a, li a, footer a {
            text-decoration: underline;
        }

        #page {
            background-color: white;
            max-width: 56rem;
            margin: 0 auto;
            border-radius: 0.5rem;
            overflow: hidden;
        }

        @media (max-width: 600px) {
            body {
                margin: 0;
            }

            #page {
                border-radius: 0;
            }
        }

        #header {
            background-color: #e7ebf7;
            padding: 2rem;
            display: flex;
            flex-direction: row;
            gap: 1.5rem;
            align-items: center;
        }

        .avatar {
            width: 6rem;
            height: 6rem;
            border-radius: 50%;
            object-fit: cover;
        }

        .profile_name {
            margin: 0;
            font-size: 2rem;
        }

        .profile_tagline, .profile_stats {
            color: var(--muted);
            margin: 0.25rem 0;
        }

        .profile_links {
            display: flex;
            flex-wrap: wrap;
            gap: 0.75rem;
            padding: 0;
            list-style: none;
        }

        #sections {
            background-color: #343a40;
            padding: 0.5rem 2rem;
            display: flex;
            flex-wrap: wrap;
            gap: 1rem;
        }

        .section_link {
            color: #dee2e6;
        }

        .section_link_active {
            color: white;
            font-weight: bold;
        }

        #main {
            margin: 2rem;
            min-height: 24rem;
        }

        .section {
            margin-bottom: 2.5rem;
        }

        .section_heading {
            border-bottom: 1px dashed darkgray;
            padding-bottom: 0.25rem;
        }

        .entry {
            display: block;
            padding: 0.75rem;
            margin-bottom: 0.5rem;
            border: 1px solid #e9ecef;
            background-color: #fbfbfa;
            color: inherit;
        }

        .entry_title {
            margin: 0;
            font-size: 1.1rem;
            color: var(--accent);
        }

        .entry_meta, .empty_state {
            color: var(--muted);
            font-size: 0.85rem;
        }

        .tags {
            display: flex;
            flex-wrap: wrap;
            gap: 0.25rem;
            padding: 0;
            list-style: none;
        }

        .tag {
            font-size: 0.75rem;
            background-color: #e7ebf7;
            padding: 0.1rem 0.4rem;
            border-radius: 0.25rem;
        }

        .gallery {
            display: flex;
            flex-wrap: wrap;
            gap: 0.5rem;
        }

        .gallery_item {
            width: 12rem;
            margin: 0;
        }

        .gallery_media, .detail_image {
            width: 100%;
            height: auto;
            background-color: #282828;
        }

        #footer {
            background-color: #e7ebf7;
            text-align: center;
            padding: 0.5rem;
        }
    "#
        .into(),
    );

    let config = props.config;
    let web_site_structured_data = write_structured_data(WebSiteStructuredData {
        _type: "WebSite",
        url: config.root_url.clone(),
        name: config.title.clone(),
        description: config.description.clone(),
        author: PersonStructuredData::new(config),
    });
    let author = Some(config.profile.name.clone()).filter(|name| !name.is_empty());

    html! {
        <html lang="en">
            <head>
                <meta charset="UTF-8"/>
                <title>{props.title.clone()}</title>
                <meta property="og:title" content={props.title.clone()}/>
                <meta property="og:site_name" content={config.title.clone()}/>
                if let Some(description) = props.description.clone() {
                    <meta name="description" content={description.clone()}/>
                    <meta property="og:description" content={description}/>
                }
                if let Some(author) = author.clone() {
                    <meta name="author" content={author}/>
                }
                <meta name="generator" content="folio"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <meta property="og:type" content="website"/>
                if let Some(url) = config.absolute(&props.canonical) {
                    <link rel="canonical" href={url.clone()}/>
                    <meta property="og:url" content={url}/>
                }
                if let Some(og_image) = &props.og_image {
                    <meta property="og:image" content={
                        config.absolute(og_image).unwrap_or_else(|| og_image.clone())
                    }/>
                }
                {web_site_structured_data}
                {props.head.clone()}
                <style>{style}</style>
            </head>
            <body>
                <div id="page">
                    {props.header.clone()}
                    <main id="main">
                        {props.body.clone()}
                    </main>
                    <footer id="footer">
                        {join(&author.map(|author| html!{<>
                            {"Published by "}
                            {author}
                        </>}).into_iter()
                            .chain(std::iter::once(html!{{"Powered by folio"}}))
                        .collect::<Vec<_>>(), &html!{{" | "}})}
                    </footer>
                </div>
            </body>
        </html>
    }
}

// Takes around 10ms.
pub fn render_html(props: AppProps<'_>) -> Vec<u8> {
    let html = app(props);

    #[derive(Properties, PartialEq)]
    struct InnerAppProps {
        html: Html,
    }

    #[function_component(InnerApp)]
    fn inner_app(props: &InnerAppProps) -> Html {
        props.html.clone()
    }

    let renderer =
        LocalServerRenderer::<InnerApp>::with_props(InnerAppProps { html }).hydratable(false);
    let html = futures::executor::block_on(renderer.render());

    let mut options = markup_fmt::config::FormatOptions::default();
    options.layout.use_tabs = true;
    options.layout.indent_width = 1;
    let formatted =
        markup_fmt::format_text(&html, markup_fmt::Language::Html, &options, |code, _| {
            Ok::<_, std::convert::Infallible>(code.into())
        });
    let mut html = match formatted {
        Ok(formatted) => formatted,
        Err(_) => {
            warn!("couldn't format page, writing it as rendered");
            html
        }
    };

    html.insert_str(0, "<!DOCTYPE html>\n");

    drop_blank_lines(&html).into_bytes()
}

/// Removes whitespace-only lines, except inside `<pre>` where they are content.
fn drop_blank_lines(html: &str) -> String {
    let mut in_pre = false;
    let mut ret = String::with_capacity(html.len());
    for line in html.lines() {
        if in_pre || !line.chars().all(|c| c.is_whitespace()) {
            ret.push_str(line);
            ret.push('\n');
        }
        let opened = line.rfind("<pre>").max(line.rfind("<pre "));
        let closed = line.rfind("</pre>");
        in_pre = match (opened, closed) {
            (Some(opened), Some(closed)) => opened > closed,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => in_pre,
        };
    }
    ret
}

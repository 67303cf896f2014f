use crate::{
    config::{MediaKind, SiteConfig},
    content::{Category, ContentRecord, ProjectTag},
    output::{markdown_html, rich_text_html, Site},
    stats::VanityStats,
    view::{location, Section},
};
use chrono::NaiveDate;
use yew::{classes, html, Html};

/// `2024-03-01` as `March 1, 2024`; anything else as written.
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_owned())
}

pub fn render_profile(config: &SiteConfig, stats: &VanityStats) -> Html {
    let profile = &config.profile;
    let name = if profile.name.is_empty() {
        config.title.clone()
    } else {
        profile.name.clone()
    };
    html! {
        <header id="header">
            if let Some(avatar) = profile.avatar.clone() {
                <img class="avatar" src={avatar} alt={name.clone()}/>
            }
            <div class="profile">
                <h1 class="profile_name">{name}</h1>
                if let Some(tagline) = profile.tagline.clone() {
                    <p class="profile_tagline">{tagline}</p>
                }
                <p class="profile_stats">
                    {format!(
                        "{} contributions · {} stars · {} repositories · mostly {}",
                        stats.contributions, stats.stars, stats.repositories, stats.top_language
                    )}
                </p>
                if !profile.links.is_empty() {
                    <ul class="profile_links">
                        {profile.links.iter().map(|link| html!{
                            <li>
                                <a href={link.url.clone()} target="_blank">{link.label.clone()}</a>
                            </li>
                        }).collect::<Html>()}
                    </ul>
                }
            </div>
        </header>
    }
}

pub fn render_nav(active: Section) -> Html {
    html! {
        <nav id="sections" aria-label="Sections">
            {Section::ALL.into_iter().map(|section| {
                let is_active = section == active;
                html!{
                    <a
                        href={format!("{}#{}", location::BASE, section.id())}
                        class={classes!("section_link", is_active.then_some("section_link_active"))}
                        aria-current={is_active.then_some("true")}
                    >{section.label()}</a>
                }
            }).collect::<Html>()}
        </nav>
    }
}

/// Every section; `active` is marked and the others follow in order.
pub fn render_listing(site: Site<'_>, active: Section) -> Html {
    Section::ALL
        .into_iter()
        .filter_map(|section| {
            let content = match section {
                Section::About => render_about(site.config),
                Section::Projects => render_projects(site.config),
                Section::Writing => Some(render_writing(&site.library.posts)),
                Section::Updates => Some(render_updates(site)),
                Section::Tech => render_tech(site.config),
                Section::Gallery => render_gallery(site.config),
                Section::Resume => render_resume(site.config),
            }?;
            Some(html! {
                <section
                    id={section.id()}
                    class={classes!("section", (section == active).then_some("section_active"))}
                >
                    <h2 class="section_heading">{section.label()}</h2>
                    {content}
                </section>
            })
        })
        .collect()
}

fn render_about(config: &SiteConfig) -> Option<Html> {
    let bio = config.profile.bio.trim();
    (!bio.is_empty()).then(|| markdown_html(bio))
}

fn render_projects(config: &SiteConfig) -> Option<Html> {
    if config.projects.is_empty() {
        return None;
    }
    Some(
        config
            .projects
            .iter()
            .map(|project| {
                html! {
                    <div class="entry">
                        <h3 class="entry_title">
                            if let Some(url) = project.url.clone() {
                                <a href={url} target="_blank">{project.name.clone()}</a>
                            } else {
                                {project.name.clone()}
                            }
                        </h3>
                        if !project.description.is_empty() {
                            <p>{project.description.clone()}</p>
                        }
                        if !project.tags.is_empty() {
                            <ul class="tags">
                                {project.tags.iter().map(|tag| html!{
                                    <li class="tag">{tag.clone()}</li>
                                }).collect::<Html>()}
                            </ul>
                        }
                    </div>
                }
            })
            .collect(),
    )
}

fn render_entry(record: &ContentRecord) -> Html {
    html! {
        <a class="entry" href={location::encode(Some(&record.key()))}>
            <h3 class="entry_title">{record.title.clone()}</h3>
            <div class="entry_meta">
                if matches!(record.category, Category::Update(_)) {
                    {record.group_label.clone()}
                    if !record.date.is_empty() {
                        {" · "}
                    }
                }
                if !record.date.is_empty() {
                    <time datetime={record.date.clone()}>{format_date(&record.date)}</time>
                }
            </div>
            if !record.summary.is_empty() {
                <p>{record.summary.clone()}</p>
            }
        </a>
    }
}

fn render_writing(posts: &[ContentRecord]) -> Html {
    if posts.is_empty() {
        return html! {
            <p class="empty_state">{"No writings published yet"}</p>
        };
    }
    posts.iter().map(render_entry).collect()
}

fn render_updates(site: Site<'_>) -> Html {
    if site.config.updates.is_empty() || site.library.updates.is_empty() {
        return html! {
            <p class="empty_state">{"No updates found."}</p>
        };
    }
    site.config
        .updates
        .iter()
        .map(|source| {
            let project = ProjectTag::new(&source.id);
            let updates = site.library.updates_for(&project).collect::<Vec<_>>();
            let count = match updates.len() {
                1 => "1 update".to_owned(),
                n => format!("{n} updates"),
            };
            html! {
                <div class="project_updates">
                    <h3>
                        if let Some(url) = source.url.clone() {
                            <a href={url} target="_blank">{source.name.clone()}</a>
                        } else {
                            {source.name.clone()}
                        }
                        <span class="entry_meta">{format!(" ({count})")}</span>
                    </h3>
                    if updates.is_empty() {
                        <p class="empty_state">{"No updates found."}</p>
                    } else {
                        {updates.into_iter().map(render_entry).collect::<Html>()}
                    }
                </div>
            }
        })
        .collect()
}

fn render_tech(config: &SiteConfig) -> Option<Html> {
    (!config.tech.is_empty()).then(|| {
        html! {
            <ul class="tags">
                {config.tech.iter().map(|tech| html!{
                    <li class="tag">{tech.clone()}</li>
                }).collect::<Html>()}
            </ul>
        }
    })
}

fn render_gallery(config: &SiteConfig) -> Option<Html> {
    (!config.gallery.is_empty()).then(|| {
        html! {
            <div class="gallery">
                {config.gallery.iter().map(|media| {
                    let alt = media.caption.clone().unwrap_or_default();
                    html!{
                        <figure class="gallery_item">
                            if media.kind == MediaKind::Video {
                                <video
                                    class="gallery_media"
                                    src={media.src.clone()}
                                    controls={true}
                                    muted={true}
                                    preload="metadata"
                                />
                            } else {
                                <img
                                    class="gallery_media"
                                    src={media.src.clone()}
                                    {alt}
                                    loading="lazy"
                                />
                            }
                            if let Some(caption) = media.caption.clone() {
                                <figcaption>{caption}</figcaption>
                            }
                        </figure>
                    }
                }).collect::<Html>()}
            </div>
        }
    })
}

fn render_resume(config: &SiteConfig) -> Option<Html> {
    config.resume_url.clone().map(|url| {
        html! {
            <p><a href={url} target="_blank">{"View resume"}</a></p>
        }
    })
}

/// A single record with its body. Closing links back to the bare location.
pub fn render_detail(config: &SiteConfig, record: &ContentRecord) -> Html {
    html! {
        <article id="detail">
            <a class="detail_close" href={location::encode(None)}>{"← Back"}</a>
            <h1>{record.title.clone()}</h1>
            <div class="entry_meta">
                if let Some(project) = record.category.project() {
                    {format!("{} · {}", config.project_name(project), record.group_label)}
                    if !record.date.is_empty() {
                        {" · "}
                    }
                }
                if !record.date.is_empty() {
                    <time datetime={record.date.clone()}>{format_date(&record.date)}</time>
                }
            </div>
            if let Some(image) = record.image.clone() {
                <img class="detail_image" src={image} alt={record.title.clone()}/>
            }
            if let Some(body) = &record.body {
                {rich_text_html(body)}
            } else {
                <p>{record.summary.clone()}</p>
            }
        </article>
    }
}

//! Page content: the copy, links and project records the page is built from.
//!
//! Content lives in `site.toml` at the root of the content directory. Every
//! section has defaults, so a file only needs the parts it changes:
//!
//! ```toml
//! brand = "Studio North"
//!
//! [[projects.items]]
//! title = "Harbour Lights"
//! description = "Identity and site for a waterfront festival."
//! image = "https://images.example.com/harbour.jpg"
//! tags = ["Branding", "Web"]
//! link = "https://harbour.example.com"
//! ```
//!
//! An `about.md` next to `site.toml` replaces `about.intro` and is rendered
//! as markdown.
//!
//! The page has four fixed sections, addressed by anchor:
//! `#home`, `#about`, `#projects`, `#contact`. Every navigation link and call
//! to action must target one of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SECTION_IDS: [&str; 4] = ["home", "about", "projects", "contact"];

pub const SITE_FILE: &str = "site.toml";
pub const ABOUT_FILE: &str = "about.md";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no {SITE_FILE} found in {}", .0.display())]
    Missing(PathBuf),
    #[error("Content validation error: {0}")]
    Validation(String),
}

/// Everything the page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Site {
    /// Name in the header and footer.
    pub brand: String,
    /// Document `<title>`; falls back to `brand`.
    pub title: Option<String>,
    /// `lang` attribute of the document.
    pub lang: String,
    pub nav: Vec<NavLink>,
    /// Call to action in the header, next to the navigation.
    pub cta: Option<NavLink>,
    pub hero: Hero,
    pub about: About,
    pub projects: Projects,
    pub contact: Contact,
    pub socials: Vec<SocialLink>,
    pub footer: Footer,
}

/// A same-page link: `target` names a section anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    pub target: String,
}

impl NavLink {
    fn new(label: &str, target: &str) -> Self {
        Self {
            label: label.to_string(),
            target: target.to_string(),
        }
    }

    /// Target without a leading `#`.
    pub fn anchor(&self) -> &str {
        self.target.trim_start_matches('#')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Picture {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hero {
    pub headline: String,
    /// Part of the headline shown in the accent color, if it occurs in it.
    pub highlight: Option<String>,
    pub tagline: String,
    pub image: Option<Picture>,
    pub actions: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct About {
    pub heading: String,
    /// Markdown.
    pub intro: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Projects {
    pub heading: String,
    pub intro: String,
    pub link_label: String,
    pub items: Vec<Project>,
}

/// One gallery card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub title: String,
    pub description: String,
    /// Image URL, fetched lazily.
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_project_link")]
    pub link: String,
}

fn default_project_link() -> String {
    "#".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Contact {
    pub heading: String,
    pub intro: String,
    pub name_label: String,
    pub name_placeholder: String,
    pub email_label: String,
    pub email_placeholder: String,
    pub message_label: String,
    pub message_placeholder: String,
    pub submit_label: String,
    pub success_title: String,
    pub success_body: String,
    pub send_another_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Footer {
    pub copyright: Option<String>,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            brand: "DevPortfolio".to_string(),
            title: None,
            lang: "en".to_string(),
            nav: vec![
                NavLink::new("Home", "home"),
                NavLink::new("About", "about"),
                NavLink::new("Projects", "projects"),
                NavLink::new("Contact", "contact"),
            ],
            cta: Some(NavLink::new("Start a project", "contact")),
            hero: Hero::default(),
            about: About::default(),
            projects: Projects::default(),
            contact: Contact::default(),
            socials: vec![
                SocialLink {
                    label: "GitHub".to_string(),
                    url: "https://github.com".to_string(),
                },
                SocialLink {
                    label: "LinkedIn".to_string(),
                    url: "https://linkedin.com".to_string(),
                },
            ],
            footer: Footer::default(),
        }
    }
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            headline: "We build modern web solutions".to_string(),
            highlight: Some("modern".to_string()),
            tagline: "Responsive, fast websites built around the people who use them".to_string(),
            image: Some(Picture {
                src: "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=800&q=80"
                    .to_string(),
                alt: "Web application development".to_string(),
            }),
            actions: vec![
                NavLink::new("See projects", "projects"),
                NavLink::new("Get in touch", "contact"),
            ],
        }
    }
}

impl Default for About {
    fn default() -> Self {
        Self {
            heading: "Why work with us?".to_string(),
            intro: "We build web solutions that work on every device and go beyond what clients expect.".to_string(),
            features: vec![
                Feature {
                    title: "Responsive design".to_string(),
                    body: "Sites that look right on desktop, tablet and mobile, with the best experience on each.".to_string(),
                },
                Feature {
                    title: "SEO ready".to_string(),
                    body: "Semantic markup, sound structure and meta tags for strong search rankings.".to_string(),
                },
                Feature {
                    title: "Mobile first".to_string(),
                    body: "Development starts on the smallest screen, so every screen works well.".to_string(),
                },
            ],
        }
    }
}

impl Default for Projects {
    fn default() -> Self {
        let project = |title: &str, description: &str, image: &str, tags: &[&str]| Project {
            title: title.to_string(),
            description: description.to_string(),
            image: image.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            link: default_project_link(),
        };
        Self {
            heading: "Our projects".to_string(),
            intro: "A portfolio of delivered projects built with modern technology.".to_string(),
            link_label: "View project".to_string(),
            items: vec![
                project(
                    "E-Commerce Platform",
                    "A modern storefront with payment integration, a shopping cart and an admin dashboard.",
                    "https://images.unsplash.com/photo-1557821552-17105176677c?w=800&q=80",
                    &["React", "Node.js", "MongoDB"],
                ),
                project(
                    "Corporate Website",
                    "A responsive corporate site with animations and a CMS for easy updates.",
                    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&q=80",
                    &["React", "Tailwind", "CMS"],
                ),
                project(
                    "Mobile App Landing",
                    "A landing page for a mobile app with interactive feature demos and a sign-up form.",
                    "https://images.unsplash.com/photo-1512941937669-90a1b58e7e9c?w=800&q=80",
                    &["React", "Framer Motion", "API"],
                ),
                project(
                    "Portfolio Dashboard",
                    "An interactive portfolio dashboard with charts, analytics and data export.",
                    "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=800&q=80",
                    &["React", "Chart.js", "REST API"],
                ),
                project(
                    "Social Media App",
                    "A social platform with profiles, a news feed, likes and real-time comments.",
                    "https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=800&q=80",
                    &["React", "Firebase", "Real-time"],
                ),
                project(
                    "Booking System",
                    "A booking system with a calendar, availability management, notifications and payments.",
                    "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=800&q=80",
                    &["React", "Node.js", "PostgreSQL"],
                ),
            ],
        }
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            heading: "Get in touch".to_string(),
            intro: "Ready to start your project? Write to us!".to_string(),
            name_label: "Your name".to_string(),
            name_placeholder: "Jane Doe".to_string(),
            email_label: "Email".to_string(),
            email_placeholder: "jane@example.com".to_string(),
            message_label: "Message".to_string(),
            message_placeholder: "Tell us about your project...".to_string(),
            submit_label: "Send message".to_string(),
            success_title: "Message sent!".to_string(),
            success_body: "Thanks for reaching out. We will get back to you shortly.".to_string(),
            send_another_label: "Send another message".to_string(),
        }
    }
}

impl Site {
    pub fn document_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.brand)
    }

    /// Every same-page link on the page, with where it appears.
    fn links(&self) -> impl Iterator<Item = (&'static str, &NavLink)> {
        self.nav
            .iter()
            .map(|l| ("nav", l))
            .chain(self.cta.iter().map(|l| ("cta", l)))
            .chain(self.hero.actions.iter().map(|l| ("hero action", l)))
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.brand.trim().is_empty() {
            return Err(ContentError::Validation("brand must not be empty".into()));
        }
        for (place, link) in self.links() {
            if !SECTION_IDS.contains(&link.anchor()) {
                return Err(ContentError::Validation(format!(
                    "{place} link '{}' targets unknown section '#{}' (expected one of: {})",
                    link.label,
                    link.anchor(),
                    SECTION_IDS.join(", ")
                )));
            }
        }
        for (i, project) in self.projects.items.iter().enumerate() {
            if project.title.trim().is_empty() {
                return Err(ContentError::Validation(format!(
                    "projects.items[{i}] has an empty title"
                )));
            }
            if project.image.trim().is_empty() {
                return Err(ContentError::Validation(format!(
                    "project '{}' has no image",
                    project.title
                )));
            }
        }
        Ok(())
    }
}

/// Load `site.toml` (and `about.md` if present) from the content directory.
pub fn load_site(root: &Path) -> Result<Site, ContentError> {
    let site_path = root.join(SITE_FILE);
    if !site_path.exists() {
        return Err(ContentError::Missing(root.to_path_buf()));
    }
    let mut site: Site = toml::from_str(&fs::read_to_string(&site_path)?)?;

    let about_path = root.join(ABOUT_FILE);
    if about_path.exists() {
        site.about.intro = fs::read_to_string(&about_path)?;
    }

    site.validate()?;
    Ok(site)
}

/// Starter `site.toml`, written by `vitrine init`.
pub fn stock_site_toml() -> &'static str {
    r##"# Vitrine site content
# ====================
# Every section is optional; anything left out uses the built-in defaults.
# Links target one of the page sections: home, about, projects, contact.

brand = "DevPortfolio"
lang = "en"
# title = "DevPortfolio | Web development"

nav = [
    { label = "Home", target = "home" },
    { label = "About", target = "about" },
    { label = "Projects", target = "projects" },
    { label = "Contact", target = "contact" },
]
cta = { label = "Start a project", target = "contact" }

[hero]
headline = "We build modern web solutions"
highlight = "modern"
tagline = "Responsive, fast websites built around the people who use them"
image = { src = "https://images.unsplash.com/photo-1498050108023-c5249f4df085?w=800&q=80", alt = "Web application development" }
actions = [
    { label = "See projects", target = "projects" },
    { label = "Get in touch", target = "contact" },
]

[about]
heading = "Why work with us?"
# Markdown. An about.md file next to this one takes precedence.
intro = "We build web solutions that work on every device and go beyond what clients expect."

[[about.features]]
title = "Responsive design"
body = "Sites that look right on desktop, tablet and mobile, with the best experience on each."

[[about.features]]
title = "SEO ready"
body = "Semantic markup, sound structure and meta tags for strong search rankings."

[[about.features]]
title = "Mobile first"
body = "Development starts on the smallest screen, so every screen works well."

[projects]
heading = "Our projects"
intro = "A portfolio of delivered projects built with modern technology."
link_label = "View project"

# Images are only requested once a card nears the viewport.
[[projects.items]]
title = "E-Commerce Platform"
description = "A modern storefront with payment integration, a shopping cart and an admin dashboard."
image = "https://images.unsplash.com/photo-1557821552-17105176677c?w=800&q=80"
tags = ["React", "Node.js", "MongoDB"]
link = "#"

[[projects.items]]
title = "Corporate Website"
description = "A responsive corporate site with animations and a CMS for easy updates."
image = "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&q=80"
tags = ["React", "Tailwind", "CMS"]

[[projects.items]]
title = "Mobile App Landing"
description = "A landing page for a mobile app with interactive feature demos and a sign-up form."
image = "https://images.unsplash.com/photo-1512941937669-90a1b58e7e9c?w=800&q=80"
tags = ["React", "Framer Motion", "API"]

[contact]
heading = "Get in touch"
intro = "Ready to start your project? Write to us!"
submit_label = "Send message"
success_title = "Message sent!"
success_body = "Thanks for reaching out. We will get back to you shortly."
send_another_label = "Send another message"

[[socials]]
label = "GitHub"
url = "https://github.com"

[[socials]]
label = "LinkedIn"
url = "https://linkedin.com"

[footer]
# copyright = "© 2026 DevPortfolio. All rights reserved."
"##
}

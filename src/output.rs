//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what the visitor will see (section headings, project
//! titles, the brand) and shows engine bookkeeping (node ids, observers,
//! timers) as indented context lines underneath.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! DevPortfolio
//!     4 nav links, CTA: Start a project
//!
//! Why work with us? (3 features)
//!     001 Responsive design
//!     ...
//!
//! Our projects (6 projects)
//!     001 E-Commerce Platform
//!         A modern storefront with payment integration, a shopping car...
//!         Image: https://images.unsplash.com/...
//!         Tags: React, Node.js, MongoDB
//!
//! Engine
//!     16 animated elements, 6 lazy images
//! ```
//!
//! ## Build
//!
//! ```text
//! DevPortfolio → dist/index.html (42 KB)
//!     Runtime: pkg/vitrine.js
//!     Assets: 3 files
//! ```
//!
//! ## Simulate
//!
//! ```text
//!      0ms mount (Available)
//!         restyle n0: ...
//!         observe n5 via o0 (margin 0px)
//!         ...
//!      0ms toggle menu
//!         set n1[aria-expanded="true"]
//!         set n1[aria-label="Close menu"]
//!         render n1
//!         render n2
//!         set n2[data-stage="entering"]
//!         start timer StageEnd { node: NodeId(2), epoch: 1 } (300ms)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::content::Site;
use crate::generate::{BuildReport, SiteSummary};
use crate::simulate::{Simulator, TraceEntry};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Section header with an item count.
///
/// ```text
/// Projects (6 projects)
/// About (1 feature)
/// ```
fn section_header(title: &str, count: usize, noun: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} ({} {}{})", title, count, noun, plural)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn format_kib(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the content inventory printed by `check`.
pub fn format_check_output(site: &Site, summary: &SiteSummary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(site.brand.clone());
    let cta = match &site.cta {
        Some(cta) => format!(", CTA: {}", cta.label),
        None => String::new(),
    };
    lines.push(format!("{}{} nav links{}", indent(1), summary.nav_links, cta));
    lines.push(String::new());

    lines.push(section_header(&site.about.heading, summary.features, "feature"));
    for (i, feature) in site.about.features.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), feature.title));
    }
    lines.push(String::new());

    lines.push(section_header(&site.projects.heading, summary.projects, "project"));
    for (i, project) in site.projects.items.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), project.title));
        if !project.description.is_empty() {
            lines.push(format!("{}{}", indent(2), truncate_desc(&project.description, 60)));
        }
        lines.push(format!("{}Image: {}", indent(2), project.image));
        if !project.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(2), project.tags.join(", ")));
        }
    }
    lines.push(String::new());

    lines.push("Engine".to_string());
    lines.push(format!(
        "{}{} animated elements, {} lazy images",
        indent(1),
        summary.animated,
        summary.lazy_images
    ));

    lines
}

pub fn print_check_output(site: &Site, summary: &SiteSummary) {
    for line in format_check_output(site, summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of a `build`.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    vec![
        format!(
            "{} \u{2192} {} ({})",
            report.summary.brand,
            report.index.display(),
            format_kib(report.index_bytes)
        ),
        format!("{}Runtime: {}", indent(1), report.runtime_module),
        format!(
            "{}Assets: {} file{}",
            indent(1),
            report.assets_copied,
            if report.assets_copied == 1 { "" } else { "s" }
        ),
        format!(
            "Generated 1 page, {} animated elements, {} lazy images",
            report.summary.animated, report.summary.lazy_images
        ),
    ]
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Simulate
// ============================================================================

/// Format a simulation trace: one header per dispatched event, its effects
/// indented below. Events that produced nothing are skipped unless `all`.
pub fn format_trace(trace: &[TraceEntry], all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in trace {
        if entry.effects.is_empty() && !all {
            continue;
        }
        lines.push(format!("{:>6}ms {}", entry.at.as_millis(), entry.action));
        for effect in &entry.effects {
            lines.push(format!("{}    {}", indent(1), effect));
        }
    }
    lines
}

/// Closing tally of a simulation run.
pub fn format_simulation_summary(sim: &Simulator) -> Vec<String> {
    let page = sim.page();
    let revealed = page.reveals().filter(|r| r.is_in_view()).count();
    let loaded = page.images().filter(|i| i.is_loaded()).count();
    let failed = page.images().filter(|i| i.has_failed()).count();
    let (made, released) = page.observer().subscription_counts();

    let mut lines = vec![
        format!(
            "Revealed {} of {} animated elements",
            revealed,
            page.reveals().count()
        ),
        format!(
            "Loaded {} of {} lazy images{}",
            loaded,
            page.images().count(),
            if failed > 0 {
                format!(" ({} failed)", failed)
            } else {
                String::new()
            }
        ),
        format!(
            "Observers: {} made, {} released, {} live",
            made,
            released,
            sim.live_subscriptions()
        ),
    ];
    if !sim.scrolls().is_empty() {
        lines.push(format!("Scrolled to: {}", sim.scrolls().join(", ")));
    }
    lines.push(format!(
        "Finished at {}ms, form {:?}",
        sim.now().as_millis(),
        page.form().state()
    ));
    lines
}

pub fn print_simulation(sim: &Simulator, all: bool) {
    for line in format_trace(sim.trace(), all) {
        println!("{}", line);
    }
    println!();
    for line in format_simulation_summary(sim) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

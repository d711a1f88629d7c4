//! Shared test utilities for the vitrine test suite.
//!
//! Fixture setup plus lookups over the effect lists the engine returns.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let (site, config) = generate::load(tmp.path()).unwrap();
//! let mut page = Page::new(&site, EngineSettings::from(&config));
//!
//! let effects = page.mount(Capability::Available);
//! let observer = observer_for(&effects, page.blueprint().about_heading);
//! ```

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

use crate::engine::{Effect, NodeId, ObserverId, Timer};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Effect lookups (panic with a clear message on miss)
// =========================================================================

/// Observer created for `node`. Panics if the effects hold no `Observe` for it.
pub fn observer_for(effects: &[Effect], node: NodeId) -> ObserverId {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::Observe { observer, node: n, .. } if *n == node => Some(*observer),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no observe effect for {node} in {effects:?}"))
}

/// Nodes restyled by the effects, in order.
pub fn restyled(effects: &[Effect]) -> Vec<NodeId> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Restyle { node, .. } => Some(*node),
            _ => None,
        })
        .collect()
}

/// The only timer started by the effects. Panics unless there is exactly one.
pub fn single_timer(effects: &[Effect]) -> (Timer, Duration) {
    let timers: Vec<(Timer, Duration)> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::StartTimer { timer, delay } => Some((*timer, *delay)),
            _ => None,
        })
        .collect();
    match timers.as_slice() {
        [one] => *one,
        _ => panic!("expected exactly one timer, got {timers:?}"),
    }
}

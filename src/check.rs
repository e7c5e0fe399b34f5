use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::UiConfig;
use crate::dom::MemoryDom;
use crate::error::UiError;
use crate::host::MemoryHost;
use crate::page::Page;

/// What mounting one template found.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateReport {
    pub path: PathBuf,
    pub mounted: Vec<String>,
    /// Contract IDs that appear more than once; lookups only ever see the first.
    pub duplicate_ids: Vec<String>,
}

/// Every element ID the controllers may look up.
pub fn contract_ids(config: &UiConfig) -> Vec<String> {
    let mut ids = vec![
        config.back_to_top.id.clone(),
        config.navbar.navbar_id.clone(),
        config.navbar.menu_toggle_id.clone(),
        config.navbar.mobile_menu_id.clone(),
        config.article.favorite_id.clone(),
        config.article.copy_link_id.clone(),
        config.search.input_id.clone(),
        config.search.button_id.clone(),
        config.search.order_id.clone(),
    ];
    for form in &config.subscribe.forms {
        ids.push(form.form_id.clone());
        ids.push(form.email_id.clone());
        ids.push(form.button_id.clone());
        ids.push(form.fingerprint_id.clone());
    }
    ids
}

/// Mount the page controllers against `html` the way the browser would.
pub fn check_html(html: &str, config: &UiConfig) -> Result<(Vec<String>, Vec<String>), UiError> {
    let dom = MemoryDom::from_html(html)?;
    let host = MemoryHost::default();
    let page = Page::mount(&dom, &host, config, "template-check")?;

    let present = dom.element_ids();
    let mut duplicates: Vec<String> = contract_ids(config)
        .into_iter()
        .filter(|id| present.iter().filter(|p| *p == id).count() > 1)
        .collect();
    duplicates.sort();
    duplicates.dedup();
    Ok((page.mounted(), duplicates))
}

pub fn check_template(path: &Path, config: &UiConfig) -> Result<TemplateReport, UiError> {
    let html = fs::read_to_string(path)
        .map_err(|e| UiError::Template(format!("{}: {}", path.display(), e)))?;
    let (mounted, duplicate_ids) = check_html(&html, config).map_err(|e| match e {
        UiError::Template(msg) => UiError::Template(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    Ok(TemplateReport {
        path: path.to_path_buf(),
        mounted,
        duplicate_ids,
    })
}

/// Check every template and log the result. Returns the number of failures.
pub fn run(paths: &[PathBuf], config: &UiConfig) -> u32 {
    let mut errors = 0u32;
    for path in paths {
        match check_template(path, config) {
            Ok(report) => {
                if report.mounted.is_empty() {
                    info!("  {}: no page controllers", path.display());
                } else {
                    info!("  {}: {}", path.display(), report.mounted.join(", "));
                }
                for id in &report.duplicate_ids {
                    warn!("  {}: #{} appears more than once", path.display(), id);
                }
            }
            Err(e) => {
                error!("  {}: {}", path.display(), e);
                errors += 1;
            }
        }
    }
    errors
}

//! Client-side navigation between a fixed table of views.
//!
//! Informational views are sections of one long page, application views are
//! standalone screens. The group of the destination decides the theme and
//! whether the page scrolls or the screen switches.

use crate::config::{NavigationConfig, ViewConfig};
use crate::graphics::Rgb;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewGroup {
    Informational,
    Application,
}

/// What an application view shows; informational sections are always pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Page,
    Scanner,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Rgb,
    pub secondary: Rgb,
}

/// How the shell should bring the destination into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Smooth-scroll the informational page to this section
    ScrollTo { section: usize },
    /// Show a standalone application view
    Switch,
}

pub struct Navigator {
    views: Vec<ViewConfig>,
    default: usize,
    active: usize,
    app_theme: Theme,
    info_theme: Theme,
}

impl Navigator {
    /// Builds the navigator from a validated configuration; starts on the default view
    pub fn new(config: &NavigationConfig) -> Self {
        let default = config
            .views
            .iter()
            .position(|v| v.id == config.default_view)
            .unwrap_or(0);
        Navigator {
            views: config.views.clone(),
            default,
            active: default,
            app_theme: Theme {
                primary: config.app_primary,
                secondary: config.app_secondary,
            },
            info_theme: Theme {
                primary: config.info_primary,
                secondary: config.info_secondary,
            },
        }
    }

    /// Initial navigation from a location fragment such as `#scanner`
    pub fn from_fragment(&mut self, fragment: Option<&str>) -> Transition {
        match fragment.map(|f| f.trim().trim_start_matches('#')) {
            Some(id) if !id.is_empty() => self.navigate(id),
            _ => self.activate(self.default),
        }
    }

    /// Activates `id`; unknown ids fall back to the default view
    pub fn navigate(&mut self, id: &str) -> Transition {
        match self.views.iter().position(|v| v.id == id) {
            Some(index) => self.activate(index),
            None => {
                warn!(view = id, "unknown view, falling back to default");
                self.activate(self.default)
            }
        }
    }

    pub fn navigate_index(&mut self, index: usize) -> Transition {
        if index < self.views.len() {
            self.activate(index)
        } else {
            self.activate(self.default)
        }
    }

    pub fn next(&mut self) -> Transition {
        self.activate((self.active + 1) % self.views.len())
    }

    pub fn previous(&mut self) -> Transition {
        let len = self.views.len();
        self.activate((self.active + len - 1) % len)
    }

    fn activate(&mut self, index: usize) -> Transition {
        self.active = index;
        let view = &self.views[index];
        info!(view = %view.id, "navigated");
        match view.group {
            ViewGroup::Informational => Transition::ScrollTo {
                section: self.section_of(index).unwrap_or(0),
            },
            ViewGroup::Application => Transition::Switch,
        }
    }

    pub fn views(&self) -> &[ViewConfig] {
        &self.views
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &ViewConfig {
        &self.views[self.active]
    }

    /// Whether the view at `index` is displayed
    pub fn is_view_active(&self, index: usize) -> bool {
        index == self.active
    }

    /// Whether the nav control for `index` is highlighted
    pub fn is_control_active(&self, index: usize) -> bool {
        index == self.active
    }

    pub fn theme(&self) -> Theme {
        match self.active().group {
            ViewGroup::Application => self.app_theme,
            ViewGroup::Informational => self.info_theme,
        }
    }

    /// Informational views in page order
    pub fn sections(&self) -> impl Iterator<Item = &ViewConfig> {
        self.views
            .iter()
            .filter(|v| v.group == ViewGroup::Informational)
    }

    /// Position of view `index` on the informational page
    fn section_of(&self, index: usize) -> Option<usize> {
        self.views[..=index]
            .iter()
            .filter(|v| v.group == ViewGroup::Informational)
            .count()
            .checked_sub(1)
    }
}

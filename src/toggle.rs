//! Two-state UI toggles. Each state maps to a `ClassSet` through a pure
//! function; controllers apply the set to the DOM at the boundary.

use std::slice;

use crate::config::{ArticleConfig, BackToTopConfig, FavoriteLook, NavbarConfig};
use crate::dom::ClassSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackToTopState {
    Hidden,
    Visible,
}

impl BackToTopState {
    /// Visible from the threshold onwards (inclusive).
    pub fn from_offset(offset: f64, threshold: f64) -> Self {
        if offset >= threshold {
            BackToTopState::Visible
        } else {
            BackToTopState::Hidden
        }
    }

    pub fn classes<'a>(&self, cfg: &'a BackToTopConfig) -> ClassSet<'a> {
        match self {
            BackToTopState::Visible => ClassSet {
                add: &cfg.visible_classes,
                remove: &cfg.hidden_classes,
            },
            BackToTopState::Hidden => ClassSet {
                add: &cfg.hidden_classes,
                remove: &cfg.visible_classes,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarStyle {
    Resting,
    Scrolled,
}

impl NavbarStyle {
    /// Scrolled strictly past the threshold.
    pub fn from_offset(offset: f64, threshold: f64) -> Self {
        if offset > threshold {
            NavbarStyle::Scrolled
        } else {
            NavbarStyle::Resting
        }
    }

    pub fn classes<'a>(&self, cfg: &'a NavbarConfig) -> ClassSet<'a> {
        match self {
            NavbarStyle::Scrolled => ClassSet {
                add: &cfg.scrolled_classes,
                remove: &cfg.resting_classes,
            },
            NavbarStyle::Resting => ClassSet {
                add: &cfg.resting_classes,
                remove: &cfg.scrolled_classes,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Open,
    Closed,
}

impl MenuState {
    /// The menu is open exactly when it does not carry the hidden class.
    pub fn from_hidden(hidden: bool) -> Self {
        if hidden {
            MenuState::Closed
        } else {
            MenuState::Open
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MenuState::Open => MenuState::Closed,
            MenuState::Closed => MenuState::Open,
        }
    }

    pub fn classes<'a>(&self, cfg: &'a NavbarConfig) -> ClassSet<'a> {
        let hidden = slice::from_ref(&cfg.menu_hidden_class);
        match self {
            MenuState::Open => ClassSet { add: &[], remove: hidden },
            MenuState::Closed => ClassSet { add: hidden, remove: &[] },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    Unfavorited,
    Favorited,
}

/// Icon, container and label changes for one favorite state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FavoriteRender<'a> {
    pub icon: ClassSet<'a>,
    pub container: ClassSet<'a>,
    pub label: &'a str,
}

impl FavoriteState {
    pub fn toggled(self) -> Self {
        match self {
            FavoriteState::Unfavorited => FavoriteState::Favorited,
            FavoriteState::Favorited => FavoriteState::Unfavorited,
        }
    }

    fn looks(self, cfg: &ArticleConfig) -> (&FavoriteLook, &FavoriteLook) {
        match self {
            FavoriteState::Favorited => (&cfg.favorited, &cfg.unfavorited),
            FavoriteState::Unfavorited => (&cfg.unfavorited, &cfg.favorited),
        }
    }

    pub fn render<'a>(&self, cfg: &'a ArticleConfig) -> FavoriteRender<'a> {
        let (this, other) = self.looks(cfg);
        FavoriteRender {
            icon: ClassSet {
                add: slice::from_ref(&this.icon_class),
                remove: slice::from_ref(&other.icon_class),
            },
            container: ClassSet {
                add: slice::from_ref(&this.color_class),
                remove: slice::from_ref(&other.color_class),
            },
            label: &this.label,
        }
    }
}

use std::rc::Rc;

use crate::config::{ArrowDirections, PickerTexts};
use crate::geometry::Rect;

use super::media::MediaType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Default,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetChoice {
    Cancel,
    Camera,
    Library,
    /// Index into the controller's additional actions.
    Additional(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetAction {
    pub choice: SheetChoice,
    pub title: String,
    pub style: ActionStyle,
}

/// Caller-defined sheet entry listed after the built-in sources.
///
/// Choosing it runs `handler` instead of starting a capture.
#[derive(Clone)]
pub struct AdditionalAction {
    pub title: String,
    pub style: ActionStyle,
    handler: Rc<dyn Fn()>,
}

impl AdditionalAction {
    pub fn new(title: impl Into<String>, handler: impl Fn() + 'static) -> Self {
        Self {
            title: title.into(),
            style: ActionStyle::Default,
            handler: Rc::new(handler),
        }
    }

    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn run(&self) {
        (self.handler)();
    }
}

impl std::fmt::Debug for AdditionalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdditionalAction")
            .field("title", &self.title)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// Where a popover-style sheet points on tablet layouts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopoverAnchor {
    pub source_rect: Rect,
}

/// Source-selection sheet. Actions are listed in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSheet {
    pub title: Option<String>,
    pub message: Option<String>,
    pub anchor: PopoverAnchor,
    pub permitted_arrow_directions: ArrowDirections,
    pub actions: Vec<SheetAction>,
}

impl ActionSheet {
    /// `camera` and `library` say whether each source is both allowed and
    /// available. `additional` entries are appended last, in order.
    pub fn build(
        texts: &PickerTexts,
        allowed_types: &[MediaType],
        anchor: PopoverAnchor,
        camera: bool,
        library: bool,
        additional: &[AdditionalAction],
    ) -> Self {
        let mut actions = vec![SheetAction {
            choice: SheetChoice::Cancel,
            title: texts.cancel_text.clone(),
            style: ActionStyle::Cancel,
        }];
        if camera {
            actions.push(SheetAction {
                choice: SheetChoice::Camera,
                title: camera_button_text(texts, allowed_types).to_string(),
                style: ActionStyle::Default,
            });
        }
        if library {
            actions.push(SheetAction {
                choice: SheetChoice::Library,
                title: texts.select_text.clone(),
                style: ActionStyle::Default,
            });
        }
        actions.extend(
            additional
                .iter()
                .enumerate()
                .map(|(index, action)| SheetAction {
                    choice: SheetChoice::Additional(index),
                    title: action.title.clone(),
                    style: action.style,
                }),
        );

        Self {
            title: texts.title.clone(),
            message: texts.message.clone(),
            anchor,
            permitted_arrow_directions: texts.permitted_arrow_directions,
            actions,
        }
    }

    pub fn action(&self, choice: SheetChoice) -> Option<&SheetAction> {
        self.actions.iter().find(|action| action.choice == choice)
    }
}

/// Camera button title for the allowed media types.
///
/// # Panics
///
/// Panics when `allowed_types` is empty.
pub fn camera_button_text<'a>(texts: &'a PickerTexts, allowed_types: &[MediaType]) -> &'a str {
    let video = allowed_types.contains(&MediaType::Video);
    let photo = allowed_types.contains(&MediaType::Photo);
    match (video, photo) {
        (true, true) => &texts.shot_media_text,
        (true, false) => &texts.shot_video_text,
        (false, true) => &texts.shot_photo_text,
        (false, false) => panic!("at least one media type must be allowed"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeChoice {
    Cancel,
    OpenSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoticeAction {
    pub choice: NoticeChoice,
    pub title: String,
    pub style: ActionStyle,
}

/// Shown when a required capability is denied.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessNotice {
    pub title: Option<String>,
    pub message: Option<String>,
    pub actions: Vec<NoticeAction>,
}

impl AccessNotice {
    pub fn build(texts: &PickerTexts, can_open_settings: bool) -> Self {
        let mut actions = vec![NoticeAction {
            choice: NoticeChoice::Cancel,
            title: texts.cancel_text.clone(),
            style: ActionStyle::Cancel,
        }];
        if can_open_settings {
            actions.push(NoticeAction {
                choice: NoticeChoice::OpenSettings,
                title: texts.settings_text.clone(),
                style: ActionStyle::Default,
            });
        }
        Self {
            title: texts.access_required_alert_title.clone(),
            message: texts.access_required_alert_message.clone(),
            actions,
        }
    }
}

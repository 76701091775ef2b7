use serde::{Deserialize, Serialize};

/// Accessible label of the collapse-results toggle inside the panel.
pub const COLLAPSE_RESULTS_LABEL: &str = "Collapse results";
/// Accessible label of the show-more-context toggle inside the panel.
pub const SHOW_CONTEXT_LABEL: &str = "Show more context";
/// Accessible label of the trigger that opens the sort-order menu.
pub const SORT_MENU_LABEL: &str = "Change sort order";

/// Event name the shell emits after a save and the frontend listens for.
/// Both sides must use this exact string; each crate pins it with a test.
pub const SETTINGS_UPDATED_EVENT: &str = "backlink-settings-updated";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    FileNameAtoZ,
    FileNameZtoA,
    ModifiedNewToOld,
    ModifiedOldToNew,
    CreatedNewToOld,
    CreatedOldToNew,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::FileNameAtoZ,
        SortOrder::FileNameZtoA,
        SortOrder::ModifiedNewToOld,
        SortOrder::ModifiedOldToNew,
        SortOrder::CreatedNewToOld,
        SortOrder::CreatedOldToNew,
    ];

    /// Stable identifier used in the persisted record and by the
    /// capability setter.
    pub fn id(self) -> &'static str {
        match self {
            SortOrder::FileNameAtoZ => "alphabetical",
            SortOrder::FileNameZtoA => "alphabeticalReverse",
            SortOrder::ModifiedNewToOld => "byModifiedTime",
            SortOrder::ModifiedOldToNew => "byModifiedTimeReverse",
            SortOrder::CreatedNewToOld => "byCreatedTime",
            SortOrder::CreatedOldToNew => "byCreatedTimeReverse",
        }
    }

    /// Visible text of the matching item in the panel's sort menu. Also
    /// used as the label in the settings dropdown.
    pub fn menu_label(self) -> &'static str {
        match self {
            SortOrder::FileNameAtoZ => "File name (A to Z)",
            SortOrder::FileNameZtoA => "File name (Z to A)",
            SortOrder::ModifiedNewToOld => "Modified time (new to old)",
            SortOrder::ModifiedOldToNew => "Modified time (old to new)",
            SortOrder::CreatedNewToOld => "Created time (new to old)",
            SortOrder::CreatedOldToNew => "Created time (old to new)",
        }
    }

    /// Unrecognized identifiers fall back to the default order instead of
    /// leaking verbatim into the menu match.
    pub fn from_id(id: &str) -> SortOrder {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.id() == id)
            .unwrap_or_default()
    }
}

impl Serialize for SortOrder {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(SortOrder::from_id(&id))
    }
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkSettings {
    pub collapse_results: bool,
    pub show_more_context: bool,
    pub sort_order: SortOrder,
}

// Field-by-field merge over defaults: a missing or wrong-typed field takes
// its default without discarding valid siblings from the same record.
impl<'de> Deserialize<'de> for BacklinkSettings {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(BacklinkSettings {
            collapse_results: value
                .get("collapseResults")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or_default(),
            show_more_context: value
                .get("showMoreContext")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or_default(),
            sort_order: value
                .get("sortOrder")
                .and_then(|v| SortOrder::deserialize(v).ok())
                .unwrap_or_default(),
        })
    }
}

impl BacklinkSettings {
    /// Persisted values win field-by-field; anything missing or
    /// unparseable takes the default.
    pub fn from_json(blob: &str) -> BacklinkSettings {
        serde_json::from_str(blob).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// What the reconciler reads from the host UI tree: `None` when the panel
/// marker is absent from the document, otherwise its rendered dimensions.
pub trait PanelProbe {
    fn panel_size(&self) -> Option<(f64, f64)>;
}

/// Direct setters on the panel's underlying view, when the host view
/// registry yields one.
pub trait BacklinkHandle {
    fn set_collapse_all(&mut self, on: bool);
    fn set_extra_context(&mut self, on: bool);
    fn set_sort_order(&mut self, order: SortOrder);
}

/// Simulated-interaction surface used when no capability handle exists.
pub trait PanelControls {
    /// Activates the control with the given accessible label only when it
    /// exists and is not already active. Absent and already-active are
    /// indistinguishable no-ops.
    fn click_if_inactive(&mut self, label: &str) -> bool;
    /// Activates the sort-menu trigger. The menu it opens is transient.
    fn open_sort_menu(&mut self) -> bool;
    /// Activates the menu item whose visible text matches `label`. False
    /// when the menu has not rendered yet.
    fn click_sort_option(&mut self, label: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The panel marker is not in the document. Legitimate on layouts
    /// without an open note.
    NoPanel,
    /// Panel present but rendered at zero size; an inert instance is left
    /// untouched.
    Hidden,
    /// Preferences applied through the capability handle.
    Direct,
    /// Fallback path; records which activations actually fired.
    Simulated {
        collapsed: bool,
        context: bool,
        sorted: bool,
    },
}

/// Drives the visible panel to match `settings`. Every lookup failure is
/// absorbed; the next layout-change or file-open re-attempts from scratch.
pub fn reconcile(
    probe: &impl PanelProbe,
    handle: Option<&mut dyn BacklinkHandle>,
    controls: &mut impl PanelControls,
    settings: &BacklinkSettings,
) -> Outcome {
    let Some((width, height)) = probe.panel_size() else {
        return Outcome::NoPanel;
    };
    if width <= 0.0 || height <= 0.0 {
        return Outcome::Hidden;
    }

    if let Some(handle) = handle {
        handle.set_collapse_all(settings.collapse_results);
        handle.set_extra_context(settings.show_more_context);
        handle.set_sort_order(settings.sort_order);
        return Outcome::Direct;
    }

    // Boolean toggles: a click is only dispatched when the control is
    // present and not yet in the desired state.
    let collapsed = settings.collapse_results && controls.click_if_inactive(COLLAPSE_RESULTS_LABEL);
    let context = settings.show_more_context && controls.click_if_inactive(SHOW_CONTEXT_LABEL);

    // Sort order needs a two-step interaction: open the menu, then pick
    // the matching item. The menu renders asynchronously, so the item may
    // not exist yet at query time; that is absorbed as a no-op.
    let sorted =
        controls.open_sort_menu() && controls.click_sort_option(settings.sort_order.menu_label());

    Outcome::Simulated {
        collapsed,
        context,
        sorted,
    }
}

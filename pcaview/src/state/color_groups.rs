//! Assignment of samples to colored groups.
//!
//! `ColorGroups` is a plain state container: every operation is a method
//! that mutates the store and, if one is given, the payload of the PCA
//! view currently on screen. Nothing here depends on the UI.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::payload::PlotPayload;

/// Marker color the service uses for every sample.
pub const DEFAULT_MARKER_COLOR: &str = "#272E3F";
/// Color of groups added by the user.
pub const NEW_GROUP_COLOR: &str = "#000000";

const DEFAULT_GROUPS: [(&str, &str); 2] = [("Group 1", "#FFFF00"), ("Group 2", "#272E3F")];

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub name: String,
    pub group_id: Option<GroupId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorGroup {
    pub group_id: GroupId,
    pub name: String,
    pub color_code: String,
    pub sample_names: Vec<String>,
}

/// Value offered by the group selector: which group, painted in which color.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GroupChoice {
    pub group_id: GroupId,
    pub color_code: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseChoiceError(String);

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected '<group id>, <color>', got '{}'", self.0)
    }
}

impl std::error::Error for ParseChoiceError {}

// Packed form "<group id>, <color>".
impl FromStr for GroupChoice {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, color) = s
            .split_once(',')
            .ok_or_else(|| ParseChoiceError(s.to_owned()))?;
        let (id, color) = (id.trim(), color.trim());
        if id.is_empty() || color.is_empty() {
            return Err(ParseChoiceError(s.to_owned()));
        }
        Ok(Self {
            group_id: GroupId::new(id),
            color_code: color.to_owned(),
        })
    }
}

impl fmt::Display for GroupChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.group_id, self.color_code)
    }
}

#[derive(Clone, Debug)]
pub struct ColorGroups {
    groups: Vec<ColorGroup>,
    samples: Vec<Sample>,
    next_group_number: usize,
}

impl Default for ColorGroups {
    fn default() -> Self {
        let groups: Vec<ColorGroup> = DEFAULT_GROUPS
            .iter()
            .enumerate()
            .map(|(i, (name, color))| ColorGroup {
                group_id: GroupId::new((i + 1).to_string()),
                name: (*name).to_owned(),
                color_code: (*color).to_owned(),
                sample_names: Vec::new(),
            })
            .collect();
        Self {
            next_group_number: groups.len() + 1,
            groups,
            samples: Vec::new(),
        }
    }
}

impl ColorGroups {
    /// Starts over for a freshly fetched payload: one sample per series,
    /// default groups.
    pub fn reset_for_payload(&mut self, payload: &PlotPayload) {
        *self = Self {
            samples: payload
                .series_names()
                .map(|name| Sample {
                    name: name.to_owned(),
                    group_id: None,
                })
                .collect(),
            ..Default::default()
        };
        log::debug!("tracking {} samples for coloring", self.samples.len());
    }

    /// Puts `sample_name` into the group named by `choice` and repaints the
    /// sample's series in `payload` with `choice.color_code`.
    ///
    /// Unknown groups or samples leave everything untouched; the return
    /// value tells whether the assignment happened.
    pub fn assign_sample_to_group(
        &mut self,
        sample_name: &str,
        choice: &GroupChoice,
        payload: Option<&mut PlotPayload>,
    ) -> bool {
        let Some(target) = self.group_index(&choice.group_id) else {
            log::warn!(
                "cannot assign '{}' to group {}: no such group",
                sample_name,
                choice.group_id
            );
            return false;
        };
        let Some(sample) = self.samples.iter_mut().find(|s| s.name == sample_name) else {
            log::warn!("cannot assign '{}': not a plotted sample", sample_name);
            return false;
        };
        sample.group_id = Some(choice.group_id.clone());

        // A sample belongs to one group at a time.
        for (i, grp) in self.groups.iter_mut().enumerate() {
            if i != target {
                grp.sample_names.retain(|name| name != sample_name);
            }
        }
        let grp = &mut self.groups[target];
        if !grp.sample_names.iter().any(|name| name == sample_name) {
            grp.sample_names.push(sample_name.to_owned());
        }

        if let Some(payload) = payload {
            if !payload.set_marker_color(sample_name, &choice.color_code) {
                log::warn!("no series named '{}' in the active plot", sample_name);
            }
        }
        true
    }

    /// Changes the color of the group at `group_index` and repaints its
    /// samples.
    pub fn change_group_color(
        &mut self,
        group_index: usize,
        new_color: &str,
        payload: Option<&mut PlotPayload>,
    ) -> bool {
        let Some(grp) = self.groups.get_mut(group_index) else {
            log::warn!("cannot recolor group {}: no such group", group_index);
            return false;
        };
        grp.color_code = new_color.to_owned();
        if let Some(payload) = payload {
            for name in grp.sample_names.iter() {
                if !payload.set_marker_color(name, new_color) {
                    log::warn!("no series named '{}' in the active plot", name);
                }
            }
        }
        true
    }

    pub fn add_group(&mut self) -> &ColorGroup {
        let group = ColorGroup {
            group_id: GroupId::new(self.next_group_number.to_string()),
            name: format!("Group {}", self.next_group_number),
            color_code: NEW_GROUP_COLOR.to_owned(),
            sample_names: Vec::new(),
        };
        self.next_group_number += 1;
        log::debug!("adding {} with ID {}", group.name, group.group_id);
        self.groups.push(group);
        &self.groups[self.groups.len() - 1]
    }

    /// Removes a group; its samples fall back to `default_color`.
    pub fn remove_group(
        &mut self,
        group_index: usize,
        default_color: &str,
        mut payload: Option<&mut PlotPayload>,
    ) -> bool {
        if group_index >= self.groups.len() {
            log::warn!("cannot remove group {}: no such group", group_index);
            return false;
        }
        let grp = self.groups.remove(group_index);
        for sample in self
            .samples
            .iter_mut()
            .filter(|s| s.group_id.as_ref() == Some(&grp.group_id))
        {
            sample.group_id = None;
            if let Some(payload) = payload.as_deref_mut() {
                payload.set_marker_color(&sample.name, default_color);
            }
        }
        log::debug!("removed {} with ID {}", grp.name, grp.group_id);
        true
    }

    /// Back to the two default groups, every series painted in
    /// `default_color` and no sample assigned.
    pub fn reset_all(&mut self, default_color: &str, payload: Option<&mut PlotPayload>) {
        let samples = std::mem::take(&mut self.samples);
        *self = Self {
            samples: samples
                .into_iter()
                .map(|s| Sample {
                    group_id: None,
                    ..s
                })
                .collect(),
            ..Default::default()
        };
        if let Some(payload) = payload {
            payload.paint_all(default_color);
        }
    }

    /// Paints `payload` according to the current assignment, e.g. when a
    /// cached view is shown again.
    pub fn apply_to(&self, payload: &mut PlotPayload, default_color: &str) {
        for sample in self.samples.iter() {
            let color = sample
                .group_id
                .as_ref()
                .and_then(|id| self.group_index(id))
                .map(|i| self.groups[i].color_code.as_str())
                .unwrap_or(default_color);
            payload.set_marker_color(&sample.name, color);
        }
    }

    pub fn choices(&self) -> Vec<GroupChoice> {
        self.groups.iter().map(ColorGroup::choice).collect()
    }

    pub fn groups(&self) -> &[ColorGroup] {
        &self.groups
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn group_of(&self, sample_name: &str) -> Option<&ColorGroup> {
        let id = self
            .samples
            .iter()
            .find(|s| s.name == sample_name)?
            .group_id
            .as_ref()?;
        self.groups.iter().find(|grp| &grp.group_id == id)
    }

    fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|grp| &grp.group_id == id)
    }
}

impl ColorGroup {
    pub fn choice(&self) -> GroupChoice {
        GroupChoice {
            group_id: self.group_id.clone(),
            color_code: self.color_code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::payload::tests::pca_payload;

    fn init() -> (ColorGroups, PlotPayload) {
        let _ = env_logger::builder().is_test(true).try_init();
        let payload = pca_payload(&["S1", "S2", "S3"]);
        let mut groups = ColorGroups::default();
        groups.reset_for_payload(&payload);
        (groups, payload)
    }

    fn color_of<'a>(payload: &'a PlotPayload, name: &str) -> Option<&'a str> {
        payload.series(name)?.marker_color()
    }

    #[test]
    fn test_default_groups() {
        let groups = ColorGroups::default();
        let names: Vec<&str> = groups.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 2"]);
        assert_eq!(
            groups.choices()[1].to_string(),
            format!("2, {}", DEFAULT_MARKER_COLOR)
        );
    }

    #[test]
    fn test_assign_to_existing_group() {
        let (mut groups, mut payload) = init();
        let choice: GroupChoice = "2, #ff0000".parse().unwrap();
        assert!(groups.assign_sample_to_group("S1", &choice, Some(&mut payload)));
        assert_eq!(groups.groups()[1].sample_names, vec!["S1"]);
        assert_eq!(color_of(&payload, "S1"), Some("#ff0000"));
        assert_eq!(color_of(&payload, "S2"), Some(DEFAULT_MARKER_COLOR));
        assert_eq!(groups.group_of("S1").unwrap().name, "Group 2");
    }

    #[test]
    fn test_assign_to_missing_group_is_a_no_op() {
        let (mut groups, mut payload) = init();
        let before = payload.clone();
        let choice: GroupChoice = "9, #ff0000".parse().unwrap();
        assert!(!groups.assign_sample_to_group("S1", &choice, Some(&mut payload)));
        assert_eq!(payload, before);
        assert!(groups.groups().iter().all(|g| g.sample_names.is_empty()));
    }

    #[test]
    fn test_assign_without_active_plot() {
        let (mut groups, _) = init();
        let choice = groups.choices()[0].clone();
        assert!(groups.assign_sample_to_group("S3", &choice, None));
        assert_eq!(groups.groups()[0].sample_names, vec!["S3"]);
    }

    #[test]
    fn test_assign_unknown_sample_is_a_no_op() {
        let (mut groups, mut payload) = init();
        let before = payload.clone();
        let choice = groups.choices()[0].clone();
        assert!(!groups.assign_sample_to_group("S9", &choice, Some(&mut payload)));
        assert_eq!(payload, before);
        assert!(groups.groups().iter().all(|g| g.sample_names.is_empty()));
        assert!(groups.group_of("S9").is_none());
    }

    #[test]
    fn test_assign_sample_missing_from_active_plot() {
        let (mut groups, _) = init();
        // Active view lacks the series of S3.
        let mut payload = pca_payload(&["S1", "S2"]);
        let before = payload.clone();
        let choice: GroupChoice = "1, #ff0000".parse().unwrap();
        assert!(groups.assign_sample_to_group("S3", &choice, Some(&mut payload)));
        assert_eq!(groups.groups()[0].sample_names, vec!["S3"]);
        assert_eq!(groups.group_of("S3").unwrap().name, "Group 1");
        assert_eq!(payload, before);
    }

    #[test]
    fn test_reassignment_moves_sample() {
        let (mut groups, mut payload) = init();
        let first = groups.choices()[0].clone();
        let second = groups.choices()[1].clone();
        groups.assign_sample_to_group("S1", &first, Some(&mut payload));
        groups.assign_sample_to_group("S1", &first, Some(&mut payload));
        assert_eq!(groups.groups()[0].sample_names, vec!["S1"]);

        groups.assign_sample_to_group("S1", &second, Some(&mut payload));
        assert!(groups.groups()[0].sample_names.is_empty());
        assert_eq!(groups.groups()[1].sample_names, vec!["S1"]);
    }

    #[test]
    fn test_change_group_color_repaints_members() {
        let (mut groups, mut payload) = init();
        let choice = groups.choices()[0].clone();
        groups.assign_sample_to_group("S1", &choice, Some(&mut payload));
        groups.assign_sample_to_group("S3", &choice, Some(&mut payload));

        assert!(groups.change_group_color(0, "#00FF00", Some(&mut payload)));
        for name in groups.groups()[0].sample_names.iter() {
            assert_eq!(color_of(&payload, name), Some("#00FF00"));
        }
        assert_eq!(color_of(&payload, "S2"), Some(DEFAULT_MARKER_COLOR));
        // The selector picks up the new color.
        assert_eq!(groups.choices()[0].color_code, "#00FF00");
        assert!(!groups.change_group_color(5, "#00FF00", Some(&mut payload)));
    }

    #[test]
    fn test_add_group() {
        let (mut groups, _) = init();
        let added = groups.add_group().clone();
        assert_eq!(added.name, "Group 3");
        assert_eq!(added.color_code, NEW_GROUP_COLOR);
        assert!(added.sample_names.is_empty());
        assert_eq!(groups.choices().len(), 3);
        assert_eq!(groups.choices()[2], added.choice());
    }

    #[test]
    fn test_group_ids_stay_unique_after_removal() {
        let (mut groups, mut payload) = init();
        groups.add_group();
        let third = groups.choices()[2].clone();
        groups.assign_sample_to_group("S2", &third, Some(&mut payload));
        assert!(groups.remove_group(2, DEFAULT_MARKER_COLOR, Some(&mut payload)));
        assert_eq!(color_of(&payload, "S2"), Some(DEFAULT_MARKER_COLOR));
        assert!(groups.group_of("S2").is_none());

        let added = groups.add_group().clone();
        assert_ne!(added.group_id, third.group_id);
    }

    #[test]
    fn test_group_names_stay_unique_after_removal() {
        let (mut groups, _) = init();
        groups.add_group();
        assert!(groups.remove_group(1, DEFAULT_MARKER_COLOR, None));
        groups.add_group();

        let names: Vec<&str> = groups.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Group 1", "Group 3", "Group 4"]);
    }

    #[test]
    fn test_reset_all() {
        let (mut groups, mut payload) = init();
        groups.add_group();
        let choice = groups.choices()[2].clone();
        groups.assign_sample_to_group("S1", &choice, Some(&mut payload));
        groups.change_group_color(0, "#123456", Some(&mut payload));

        groups.reset_all(DEFAULT_MARKER_COLOR, Some(&mut payload));
        let defaults = ColorGroups::default();
        assert_eq!(groups.groups(), defaults.groups());
        assert!(payload
            .data
            .iter()
            .all(|s| s.marker_color() == Some(DEFAULT_MARKER_COLOR)));
        assert!(groups.samples().iter().all(|s| s.group_id.is_none()));
        assert_eq!(groups.samples().len(), 3);
    }

    #[test]
    fn test_apply_to_cached_payload() {
        let (mut groups, _) = init();
        let choice = groups.choices()[0].clone();
        groups.assign_sample_to_group("S2", &choice, None);

        let mut other = pca_payload(&["S1", "S2", "S3"]);
        other.set_marker_color("S1", "#ABCDEF");
        groups.apply_to(&mut other, DEFAULT_MARKER_COLOR);
        assert_eq!(color_of(&other, "S2"), Some("#FFFF00"));
        assert_eq!(color_of(&other, "S1"), Some(DEFAULT_MARKER_COLOR));
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(
            "1,#FFFF00".parse::<GroupChoice>(),
            Ok(GroupChoice {
                group_id: GroupId::new("1"),
                color_code: "#FFFF00".into()
            })
        );
        assert!("no separator".parse::<GroupChoice>().is_err());
        assert!(" , #fff".parse::<GroupChoice>().is_err());
    }
}

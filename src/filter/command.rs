use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    FilterLimit, FlatIds, FullTextFilter, Linked, LinkedFilter, SystemFilter, TemporalFilter,
    EMPTY_UIDS,
};

/// Selects command streams, the control inputs of systems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandStreamFilter {
    pub internal_ids: BTreeSet<i64>,
    /// Systems receiving the commands.
    pub system: Option<Linked<SystemFilter>>,
    pub full_text: Option<FullTextFilter>,
    pub valid_time: Option<TemporalFilter>,
    pub control_input_names: BTreeSet<String>,
    /// Taskable property URIs, matched anywhere in the record schema.
    pub taskable_properties: BTreeSet<String>,
    /// Streams having at least one matching command.
    pub commands: Option<Box<CommandFilter>>,
    pub limit: Option<u64>,
}

impl CommandStreamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.internal_ids.extend(ids);
        self
    }

    pub fn with_system_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.system = Some(Linked::ids(ids));
        self
    }

    pub fn with_systems(mut self, filter: SystemFilter) -> Self {
        self.system = Some(Linked::filter(filter));
        self
    }

    pub fn with_control_input_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.control_input_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_taskable_properties<S: Into<String>>(
        mut self,
        uris: impl IntoIterator<Item = S>,
    ) -> Self {
        self.taskable_properties
            .extend(uris.into_iter().map(Into::into));
        self
    }

    pub fn with_full_text(mut self, full_text: FullTextFilter) -> Self {
        self.full_text = Some(full_text);
        self
    }

    pub fn with_valid_time(mut self, time: TemporalFilter) -> Self {
        self.valid_time = Some(time);
        self
    }

    pub fn with_commands(mut self, filter: CommandFilter) -> Self {
        self.commands = Some(Box::new(filter));
        self
    }
}

impl LinkedFilter for CommandStreamFilter {
    fn flat_ids(&self) -> Option<FlatIds<'_>> {
        let only_ids = self.system.is_none()
            && self.full_text.is_none()
            && self.valid_time.is_none()
            && self.control_input_names.is_empty()
            && self.taskable_properties.is_empty()
            && self.commands.is_none();
        only_ids.then_some(FlatIds {
            internal_ids: &self.internal_ids,
            unique_ids: &EMPTY_UIDS,
        })
    }
}

impl FilterLimit for CommandStreamFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// Selects commands sent to command streams.
///
/// Feature id [`NO_FEATURE`](super::NO_FEATURE) matches commands not
/// addressed to a feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandFilter {
    pub internal_ids: BTreeSet<i64>,
    pub command_stream: Option<Linked<CommandStreamFilter>>,
    pub sender_ids: BTreeSet<String>,
    pub foi_ids: BTreeSet<i64>,
    pub issue_time: Option<TemporalFilter>,
    pub limit: Option<u64>,
}

impl CommandFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.internal_ids.extend(ids);
        self
    }

    pub fn with_command_stream_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.command_stream = Some(Linked::ids(ids));
        self
    }

    pub fn with_command_streams(mut self, filter: CommandStreamFilter) -> Self {
        self.command_stream = Some(Linked::filter(filter));
        self
    }

    pub fn with_sender_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.sender_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_foi_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.foi_ids.extend(ids);
        self
    }

    pub fn with_issue_time(mut self, time: TemporalFilter) -> Self {
        self.issue_time = Some(time);
        self
    }
}

impl FilterLimit for CommandFilter {
    fn limit(&self) -> Option<u64> {
        self.limit
    }
}

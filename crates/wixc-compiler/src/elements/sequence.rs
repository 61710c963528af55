//! Sequence tables and action scheduling.

use std::sync::LazyLock;

use wixc_core::symbol::{ActionSymbol, SequenceTable, SuppressActionSymbol};
use wixc_core::{Identifier, SymbolData, SymbolKind};

use crate::Result;
use crate::compile::{Dispatch, EmptyRule, Parent, Scope, Session, context_map};
use crate::document::{Attribute, Element};

/// Sequence elements, by local name.
pub(crate) const SEQUENCE_ELEMENTS: [&str; 5] = [
    "InstallExecuteSequence",
    "InstallUISequence",
    "AdminExecuteSequence",
    "AdminUISequence",
    "AdvertiseExecuteSequence",
];

/// Standard actions that may be scheduled by name.
const STANDARD_ACTIONS: [&str; 22] = [
    "AppSearch",
    "LaunchConditions",
    "FindRelatedProducts",
    "CostInitialize",
    "FileCost",
    "CostFinalize",
    "InstallValidate",
    "InstallInitialize",
    "ProcessComponents",
    "RemoveFiles",
    "InstallFiles",
    "WriteRegistryValues",
    "RemoveRegistryValues",
    "RegisterProduct",
    "PublishFeatures",
    "PublishProduct",
    "InstallFinalize",
    "RemoveExistingProducts",
    "ExecuteAction",
    "MigrateFeatureStates",
    "ScheduleReboot",
    "ForceReboot",
];

const SCHEDULING: [&str; 4] = ["Sequence", "OnExit", "Before", "After"];

static SEQUENCE_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    let mut dispatch = Dispatch::new()
        .on("Custom", Session::parse_custom)
        .on("Show", Session::parse_show);
    for name in STANDARD_ACTIONS {
        dispatch = dispatch.on(name, Session::parse_standard_action);
    }
    dispatch
});

/// Table a sequence element compiles into; merge modules have their own.
fn sequence_table(name: &str, module: bool) -> Option<SequenceTable> {
    let table = match (name, module) {
        ("InstallExecuteSequence", false) => SequenceTable::InstallExecuteSequence,
        ("InstallUISequence", false) => SequenceTable::InstallUISequence,
        ("AdminExecuteSequence", false) => SequenceTable::AdminExecuteSequence,
        ("AdminUISequence", false) => SequenceTable::AdminUISequence,
        ("AdvertiseExecuteSequence", false) => SequenceTable::AdvertiseExecuteSequence,
        ("InstallExecuteSequence", true) => SequenceTable::ModuleInstallExecuteSequence,
        ("InstallUISequence", true) => SequenceTable::ModuleInstallUISequence,
        ("AdminExecuteSequence", true) => SequenceTable::ModuleAdminExecuteSequence,
        ("AdminUISequence", true) => SequenceTable::ModuleAdminUISequence,
        ("AdvertiseExecuteSequence", true) => SequenceTable::ModuleAdvertiseExecuteSequence,
        _ => return None,
    };
    Some(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Custom,
    Show,
    Standard,
}

impl ActionKind {
    /// Attribute naming the scheduled item, if the element does not.
    fn name_attribute(self) -> Option<&'static str> {
        match self {
            ActionKind::Custom => Some("Action"),
            ActionKind::Show => Some("Dialog"),
            ActionKind::Standard => None,
        }
    }

    fn needs_scheduling(self) -> bool {
        self != ActionKind::Standard
    }
}

/// Scheduling attributes as authored, before the mode is decided.
#[derive(Default)]
struct Schedule<'a> {
    sequence: Option<i32>,
    on_exit: Option<i32>,
    before: Option<(&'a Attribute, String)>,
    after: Option<(&'a Attribute, String)>,
    suppress: bool,
    /// Scheduling attributes present, in document order.
    authored: Vec<&'static str>,
}

impl Session {
    pub(super) fn parse_sequence(&mut self, element: Element<'_>, _: &mut Scope) -> Result<()> {
        let module = self.context.compiling_module();
        let Some(table) = sequence_table(element.local_name(), module) else {
            self.unexpected_element(element.parent().unwrap_or(element), element);
            return Ok(());
        };

        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if attr.is_core() {
                self.unexpected_attribute(element, attr);
            } else {
                deferred.push(attr);
            }
        }
        let table_name = table.to_string();
        let context = context_map([("Table", table_name.as_str())]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut scope = Scope::new(Parent::Sequence(table)).with_context(context);
        self.dispatch_children(element, &SEQUENCE_CHILDREN, &mut scope)
    }

    fn parse_custom(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        self.parse_scheduled_action(ActionKind::Custom, element, scope)
    }

    fn parse_show(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        self.parse_scheduled_action(ActionKind::Show, element, scope)
    }

    fn parse_standard_action(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        self.parse_scheduled_action(ActionKind::Standard, element, scope)
    }

    fn parse_scheduled_action(
        &mut self,
        kind: ActionKind,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        let Parent::Sequence(table) = scope.parent else {
            self.unexpected_element(element.parent().unwrap_or(element), element);
            return Ok(());
        };
        if kind == ActionKind::Show && !table.is_ui() {
            self.unexpected_element(element.parent().unwrap_or(element), element);
            return Ok(());
        }

        let mut action = match kind {
            ActionKind::Standard => Some(element.local_name().to_owned()),
            _ => None,
        };
        let mut schedule = Schedule::default();
        let mut condition = None;
        let mut overridable = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            let name = attr.local_name();
            if kind.name_attribute() == Some(name) {
                action = self.reference_value(element, attr);
                continue;
            }
            match name {
                "Sequence" => {
                    schedule.authored.push("Sequence");
                    schedule.sequence = self.integer(element, attr, 1, 32767);
                }
                "OnExit" if kind != ActionKind::Standard => {
                    schedule.authored.push("OnExit");
                    schedule.on_exit = self.enum_value(
                        element,
                        attr,
                        &[("success", -1), ("cancel", -2), ("error", -3), ("suspend", -4)],
                    );
                }
                "Before" => {
                    schedule.authored.push("Before");
                    schedule.before = self.reference_value(element, attr).map(|v| (attr, v));
                }
                "After" => {
                    schedule.authored.push("After");
                    schedule.after = self.reference_value(element, attr).map(|v| (attr, v));
                }
                "Suppress" => schedule.suppress = self.yes_no(element, attr).unwrap_or(false),
                "Condition" => {
                    condition =
                        self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
                }
                "Overridable" => overridable = self.yes_no(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if let Some(required) = kind.name_attribute() {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }
        let action = action.unwrap_or_default();

        self.check_schedule(kind, element, &action, &schedule);

        let id = Identifier::global(format!("{table}.{action}"));
        self.finish_leaf(element, &deferred, &id);

        if schedule.suppress {
            self.emit(
                id,
                SymbolData::SuppressAction(SuppressActionSymbol { table, action }),
            );
            return Ok(());
        }

        match kind {
            ActionKind::Custom => self.create_simple_reference(SymbolKind::CustomAction, &action),
            ActionKind::Show => self.create_simple_reference(SymbolKind::Dialog, &action),
            ActionKind::Standard => {}
        }
        let before = schedule.before.map(|(_, v)| v);
        let after = schedule.after.map(|(_, v)| v);
        for relative in before.iter().chain(after.iter()) {
            self.create_simple_reference(SymbolKind::Action, &format!("{table}.{relative}"));
        }

        self.emit(
            id,
            SymbolData::Action(ActionSymbol {
                table,
                action,
                condition,
                sequence: schedule.sequence.or(schedule.on_exit),
                before,
                after,
                overridable: overridable.unwrap_or(false),
            }),
        );
        Ok(())
    }

    /// One scheduling mode at most, never relative to itself, none at all
    /// when suppressed.
    fn check_schedule(
        &mut self,
        kind: ActionKind,
        element: Element<'_>,
        action: &str,
        schedule: &Schedule<'_>,
    ) {
        if schedule.suppress {
            if let Some(first) = schedule.authored.first() {
                self.mutually_exclusive(element, "Suppress", first);
            }
            return;
        }

        if let [first, second, ..] = schedule.authored.as_slice() {
            self.mutually_exclusive(element, first, second);
        } else if schedule.authored.is_empty() && kind.needs_scheduling() {
            self.expected_attributes(element, &SCHEDULING);
        }

        for (attr, relative) in [&schedule.before, &schedule.after].into_iter().flatten() {
            if !action.is_empty() && relative == action {
                self.illegal_value_because(
                    element,
                    attr,
                    "an action cannot be scheduled relative to itself",
                );
            }
        }
    }
}

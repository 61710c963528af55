//! Typed symbol records.
//!
//! One [`SymbolData`] variant per installer construct. Records are created once
//! at the end of compiling their element and never change afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::identifier::Identifier;
use crate::section::SectionId;

/// An emitted symbol: identifier, owning section, and kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub id: Identifier,
    pub section: SectionId,
    pub data: SymbolData,
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        self.data.kind()
    }
}

/// Field-less tag of a symbol, also used for simple references.
///
/// Some kinds (`Directory`, `Binary`, `File`, `Dialog`) are never emitted by
/// this front end but can be referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Bundle,
    Chain,
    BootstrapperApplication,
    RelatedBundle,
    BundleLog,
    BundleUpdate,
    Container,
    PackageGroup,
    RollbackBoundary,
    Package,
    Payload,
    PayloadGroup,
    MsiProperty,
    SlipstreamMsp,
    ExitCode,
    Variable,
    DependencyProvider,
    PackageSummary,
    ModuleSignature,
    Patch,
    PatchProperty,
    Property,
    Component,
    Registry,
    CustomAction,
    Action,
    SuppressAction,
    Directory,
    Binary,
    File,
    Dialog,
    Extension,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum SymbolData {
    Bundle(BundleSymbol),
    Chain(ChainSymbol),
    BootstrapperApplication(BootstrapperApplicationSymbol),
    RelatedBundle(RelatedBundleSymbol),
    BundleLog(BundleLogSymbol),
    BundleUpdate(BundleUpdateSymbol),
    Container(ContainerSymbol),
    PackageGroup,
    RollbackBoundary(RollbackBoundarySymbol),
    Package(PackageSymbol),
    Payload(PayloadSymbol),
    PayloadGroup,
    MsiProperty(MsiPropertySymbol),
    SlipstreamMsp(SlipstreamMspSymbol),
    ExitCode(ExitCodeSymbol),
    Variable(VariableSymbol),
    DependencyProvider(DependencyProviderSymbol),
    PackageSummary(PackageSummarySymbol),
    ModuleSignature(ModuleSignatureSymbol),
    Patch(PatchSymbol),
    PatchProperty(PatchPropertySymbol),
    Property(PropertySymbol),
    Component(ComponentSymbol),
    Registry(RegistrySymbol),
    CustomAction(CustomActionSymbol),
    Action(ActionSymbol),
    SuppressAction(SuppressActionSymbol),
    /// Symbol defined by a compiler extension.
    Extension {
        definition: String,
        fields: IndexMap<String, String>,
    },
}

impl SymbolData {
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolData::Bundle(_) => SymbolKind::Bundle,
            SymbolData::Chain(_) => SymbolKind::Chain,
            SymbolData::BootstrapperApplication(_) => SymbolKind::BootstrapperApplication,
            SymbolData::RelatedBundle(_) => SymbolKind::RelatedBundle,
            SymbolData::BundleLog(_) => SymbolKind::BundleLog,
            SymbolData::BundleUpdate(_) => SymbolKind::BundleUpdate,
            SymbolData::Container(_) => SymbolKind::Container,
            SymbolData::PackageGroup => SymbolKind::PackageGroup,
            SymbolData::RollbackBoundary(_) => SymbolKind::RollbackBoundary,
            SymbolData::Package(_) => SymbolKind::Package,
            SymbolData::Payload(_) => SymbolKind::Payload,
            SymbolData::PayloadGroup => SymbolKind::PayloadGroup,
            SymbolData::MsiProperty(_) => SymbolKind::MsiProperty,
            SymbolData::SlipstreamMsp(_) => SymbolKind::SlipstreamMsp,
            SymbolData::ExitCode(_) => SymbolKind::ExitCode,
            SymbolData::Variable(_) => SymbolKind::Variable,
            SymbolData::DependencyProvider(_) => SymbolKind::DependencyProvider,
            SymbolData::PackageSummary(_) => SymbolKind::PackageSummary,
            SymbolData::ModuleSignature(_) => SymbolKind::ModuleSignature,
            SymbolData::Patch(_) => SymbolKind::Patch,
            SymbolData::PatchProperty(_) => SymbolKind::PatchProperty,
            SymbolData::Property(_) => SymbolKind::Property,
            SymbolData::Component(_) => SymbolKind::Component,
            SymbolData::Registry(_) => SymbolKind::Registry,
            SymbolData::CustomAction(_) => SymbolKind::CustomAction,
            SymbolData::Action(_) => SymbolKind::Action,
            SymbolData::SuppressAction(_) => SymbolKind::SuppressAction,
            SymbolData::Extension { .. } => SymbolKind::Extension,
        }
    }

    /// Field map of the record, in declaration order, with unset fields omitted.
    ///
    /// Nested records are flattened with dotted names (`details.type`).
    pub fn fields(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::new();
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(self) {
            flatten_fields(None, map, &mut out);
        }
        out.shift_remove("kind");
        out
    }
}

fn flatten_fields(
    prefix: Option<&str>,
    map: serde_json::Map<String, serde_json::Value>,
    out: &mut IndexMap<String, String>,
) {
    for (name, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name,
        };
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::String(s) => {
                out.insert(name, s);
            }
            serde_json::Value::Object(nested) => flatten_fields(Some(&name), nested, out),
            other => {
                out.insert(name, other.to_string());
            }
        }
    }
}

// ============================================================================
// Bundle
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSymbol {
    pub name: Option<String>,
    pub version: String,
    pub manufacturer: Option<String>,
    pub upgrade_code: Option<String>,
    pub condition: Option<String>,
    pub compressed: Option<bool>,
    pub disable_modify: DisableModify,
    pub disable_remove: bool,
    pub about_url: Option<String>,
    pub help_url: Option<String>,
    pub copyright: Option<String>,
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisableModify {
    #[default]
    No,
    Yes,
    /// Modify is available but the button is hidden.
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSymbol {
    pub disable_rollback: bool,
    pub disable_system_restore: bool,
    pub parallel_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapperApplicationSymbol {
    pub source_file: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedBundleSymbol {
    pub code: String,
    pub action: RelatedBundleAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelatedBundleAction {
    #[default]
    Detect,
    Upgrade,
    Addon,
    Patch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLogSymbol {
    pub path_variable: Option<String>,
    pub prefix: String,
    pub extension: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleUpdateSymbol {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSymbol {
    pub name: Option<String>,
    pub container_type: ContainerType,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerType {
    Attached,
    #[default]
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackBoundarySymbol {
    pub vital: bool,
    pub transaction: bool,
    pub log_path_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSymbol {
    pub value: Option<String>,
    pub variable_type: VariableType,
    pub hidden: bool,
    pub persisted: bool,
}

/// Type of a bundle variable, explicit or inferred from its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableType {
    Formatted,
    Numeric,
    String,
    Version,
    /// Declared without a value.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyProviderSymbol {
    pub parent: String,
    pub key: String,
}

// ============================================================================
// Chain packages
// ============================================================================

/// The five package categories a bundle chain can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackageKind {
    Msi,
    Msp,
    Msu,
    Exe,
    Bundle,
}

impl PackageKind {
    pub const ALL: [PackageKind; 5] = [
        PackageKind::Msi,
        PackageKind::Msp,
        PackageKind::Msu,
        PackageKind::Exe,
        PackageKind::Bundle,
    ];

    /// Local name of the chain element for this kind.
    pub fn element_name(self) -> &'static str {
        match self {
            PackageKind::Msi => "MsiPackage",
            PackageKind::Msp => "MspPackage",
            PackageKind::Msu => "MsuPackage",
            PackageKind::Exe => "ExePackage",
            PackageKind::Bundle => "BundlePackage",
        }
    }

    /// Local name of the nested typed payload element for this kind.
    pub fn payload_element_name(self) -> &'static str {
        match self {
            PackageKind::Msi => "MsiPackagePayload",
            PackageKind::Msp => "MspPackagePayload",
            PackageKind::Msu => "MsuPackagePayload",
            PackageKind::Exe => "ExePackagePayload",
            PackageKind::Bundle => "BundlePackagePayload",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.element_name() == name)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSymbol {
    pub package_kind: PackageKind,
    pub payload: String,
    pub cache: CacheType,
    pub cache_id: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub install_condition: Option<String>,
    pub log_path_variable: Option<String>,
    pub rollback_log_path_variable: Option<String>,
    pub permanent: bool,
    pub vital: bool,
    pub visible: Option<bool>,
    pub per_machine: Option<YesNoDefault>,
    pub details: PackageDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheType {
    Force,
    #[default]
    Keep,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum YesNoDefault {
    Yes,
    No,
    Default,
}

/// Fields only some package kinds carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PackageDetails {
    #[serde(rename_all = "camelCase")]
    Msi {
        display_internal_ui: bool,
        enable_feature_selection: bool,
        force_per_machine: bool,
        suppress_loose_file_payload_generation: bool,
    },
    #[serde(rename_all = "camelCase")]
    Msp { slipstream: bool },
    #[serde(rename_all = "camelCase")]
    Msu { kb: Option<String> },
    #[serde(rename_all = "camelCase")]
    Exe {
        install_arguments: Option<String>,
        repair_arguments: Option<String>,
        uninstall_arguments: Option<String>,
        repair_condition: Option<String>,
        protocol: ExeProtocol,
        detection: ExeDetection,
    },
    #[serde(rename_all = "camelCase")]
    Bundle {
        install_arguments: Option<String>,
        repair_arguments: Option<String>,
        uninstall_arguments: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExeProtocol {
    #[default]
    None,
    Burn,
    Netfx4,
}

/// How the engine decides whether an executable package is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum ExeDetection {
    /// Add/Remove Programs registration written by the executable.
    Arp {
        id: String,
        version: String,
        win64: bool,
    },
    Condition { condition: String },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSymbol {
    pub name: Option<String>,
    pub source_file: Option<String>,
    pub download_url: Option<String>,
    pub compressed: Option<bool>,
    pub hash: Option<String>,
    pub size: Option<i64>,
    pub certificate_public_key: Option<String>,
    pub certificate_thumbprint: Option<String>,
    pub description: Option<String>,
    pub product_name: Option<String>,
    pub version: Option<String>,
    /// Fetched at install time rather than carried from a local file.
    pub remote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MsiPropertySymbol {
    pub package: String,
    pub name: String,
    pub value: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipstreamMspSymbol {
    pub package: String,
    pub msp_package: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitCodeSymbol {
    pub package: String,
    /// `None` applies to every code not listed explicitly.
    pub code: Option<i32>,
    pub behavior: ExitCodeBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitCodeBehavior {
    Success,
    Error,
    ScheduleReboot,
    ForceReboot,
}

// ============================================================================
// Installer database
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummarySymbol {
    pub name: String,
    pub manufacturer: String,
    pub version: String,
    pub language: i32,
    pub codepage: Option<i32>,
    pub upgrade_code: Option<String>,
    pub product_code: String,
    pub installer_version: i32,
    pub scope: InstallScope,
    pub compressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallScope {
    #[default]
    PerMachine,
    PerUser,
    PerUserOrMachine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSignatureSymbol {
    pub language: i32,
    pub version: String,
    pub codepage: Option<i32>,
    pub guid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSymbol {
    pub classification: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub allow_removal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPropertySymbol {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySymbol {
    pub value: Option<String>,
    pub secure: bool,
    pub hidden: bool,
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSymbol {
    /// `*` when the guid is generated at bind time.
    pub guid: Option<String>,
    pub directory: Option<String>,
    pub bitness: Bitness,
    pub key_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Bitness {
    #[default]
    Default,
    Always32,
    Always64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySymbol {
    pub component: String,
    pub root: RegistryRoot,
    pub key: String,
    pub name: Option<String>,
    pub value: Option<String>,
    pub value_type: RegistryValueType,
    /// The value is the key path of its component.
    pub key_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistryRoot {
    HKCR,
    HKCU,
    HKLM,
    HKU,
    /// HKLM for per-machine installs, HKCU otherwise.
    HKMU,
}

impl RegistryRoot {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistryRoot::HKCR => "HKCR",
            RegistryRoot::HKCU => "HKCU",
            RegistryRoot::HKLM => "HKLM",
            RegistryRoot::HKU => "HKU",
            RegistryRoot::HKMU => "HKMU",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistryValueType {
    #[default]
    String,
    Integer,
    Binary,
    Expandable,
    MultiString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomActionSymbol {
    pub source_kind: CustomActionSource,
    pub source: Option<String>,
    pub target_kind: CustomActionTarget,
    pub target: Option<String>,
    pub execute: ExecuteType,
    pub return_type: ReturnType,
    pub impersonate: bool,
    pub hide_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomActionSource {
    Binary,
    File,
    Property,
    Directory,
    /// Script body embedded in the element text.
    InlineScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomActionTarget {
    Dll,
    Exe,
    Value,
    #[serde(rename = "jscript")]
    JScript,
    #[serde(rename = "vbscript")]
    VBScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecuteType {
    #[default]
    Immediate,
    Deferred,
    Rollback,
    Commit,
    OncePerProcess,
    FirstSequence,
    SecondSequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnType {
    #[default]
    Check,
    Ignore,
    AsyncWait,
    AsyncNoWait,
}

/// Sequence tables actions can be scheduled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SequenceTable {
    InstallExecuteSequence,
    InstallUISequence,
    AdminExecuteSequence,
    AdminUISequence,
    AdvertiseExecuteSequence,
    ModuleInstallExecuteSequence,
    ModuleInstallUISequence,
    ModuleAdminExecuteSequence,
    ModuleAdminUISequence,
    ModuleAdvertiseExecuteSequence,
}

impl SequenceTable {
    pub fn is_ui(self) -> bool {
        matches!(
            self,
            SequenceTable::InstallUISequence
                | SequenceTable::AdminUISequence
                | SequenceTable::ModuleInstallUISequence
                | SequenceTable::ModuleAdminUISequence
        )
    }
}

impl fmt::Display for SequenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSymbol {
    pub table: SequenceTable,
    pub action: String,
    pub condition: Option<String>,
    /// Negative values are the OnExit slots (-1 success, -2 cancel, -3 error, -4 suspend).
    pub sequence: Option<i32>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub overridable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressActionSymbol {
    pub table: SequenceTable,
    pub action: String,
}

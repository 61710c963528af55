//! Chain packages: one generic handler for the five kinds, driven by a
//! legality table, plus their child elements.

use std::sync::LazyLock;

use wixc_core::symbol::{
    CacheType, ExeDetection, ExeProtocol, ExitCodeBehavior, ExitCodeSymbol, MsiPropertySymbol,
    PackageDetails, PackageSymbol, SlipstreamMspSymbol, YesNoDefault,
};
use wixc_core::{
    ComplexReferenceChild, ComplexReferenceParent, Identifier, PackageKind, SymbolData,
    SymbolKind,
};

use crate::Result;
use crate::compile::{
    ArpEntry, Dispatch, EmptyRule, OrderingCursor, PackageScope, Parent, PayloadBuilder, Scope,
    Session, context_map, generate_identifier,
};
use crate::document::Element;

// ============================================================================
// Legality
// ============================================================================

/// Attributes every package kind accepts.
const COMMON_ATTRIBUTES: [&str; 15] = [
    "Id",
    "Name",
    "SourceFile",
    "DownloadUrl",
    "Compressed",
    "After",
    "Cache",
    "CacheId",
    "Description",
    "DisplayName",
    "InstallCondition",
    "LogPathVariable",
    "RollbackLogPathVariable",
    "Permanent",
    "Vital",
];

/// Child elements every package kind accepts, besides its typed payload.
const COMMON_ELEMENTS: [&str; 2] = ["Payload", "PayloadGroupRef"];

/// What one package kind may carry beyond the common set.
#[derive(Debug)]
pub(crate) struct Capabilities {
    pub(crate) attributes: &'static [&'static str],
    pub(crate) elements: &'static [&'static str],
}

const ARGUMENTS: [&str; 6] = [
    "InstallArguments",
    "RepairArguments",
    "UninstallArguments",
    "InstallCommand",
    "RepairCommand",
    "UninstallCommand",
];

pub(crate) fn capabilities(kind: PackageKind) -> &'static Capabilities {
    static MSI: Capabilities = Capabilities {
        attributes: &[
            "Visible",
            "DisplayInternalUI",
            "EnableFeatureSelection",
            "ForcePerMachine",
            "SuppressLooseFilePayloadGeneration",
        ],
        elements: &["MsiProperty", "SlipstreamMsp"],
    };
    static MSP: Capabilities = Capabilities {
        attributes: &["PerMachine", "Slipstream"],
        elements: &["MsiProperty"],
    };
    static MSU: Capabilities = Capabilities {
        attributes: &["KB"],
        elements: &[],
    };
    static EXE: Capabilities = Capabilities {
        attributes: &[
            "PerMachine",
            "DetectCondition",
            "Protocol",
            "RepairCondition",
            ARGUMENTS[0],
            ARGUMENTS[1],
            ARGUMENTS[2],
            ARGUMENTS[3],
            ARGUMENTS[4],
            ARGUMENTS[5],
        ],
        elements: &["ExitCode", "ArpEntry"],
    };
    static BUNDLE: Capabilities = Capabilities {
        attributes: &[
            "Visible",
            "PerMachine",
            ARGUMENTS[0],
            ARGUMENTS[1],
            ARGUMENTS[2],
            ARGUMENTS[3],
            ARGUMENTS[4],
            ARGUMENTS[5],
        ],
        elements: &["ExitCode"],
    };
    match kind {
        PackageKind::Msi => &MSI,
        PackageKind::Msp => &MSP,
        PackageKind::Msu => &MSU,
        PackageKind::Exe => &EXE,
        PackageKind::Bundle => &BUNDLE,
    }
}

impl Capabilities {
    pub(crate) fn allows_attribute(&self, name: &str) -> bool {
        COMMON_ATTRIBUTES.contains(&name) || self.attributes.contains(&name)
    }

    pub(crate) fn allows_element(&self, name: &str) -> bool {
        COMMON_ELEMENTS.contains(&name) || self.elements.contains(&name)
    }
}

static PACKAGE_CHILDREN: LazyLock<Dispatch> = LazyLock::new(|| {
    Dispatch::new()
        .on("Payload", Session::parse_payload)
        .on("PayloadGroupRef", Session::parse_payload_group_ref)
        .on("MsiProperty", Session::parse_msi_property)
        .on("SlipstreamMsp", Session::parse_slipstream_msp)
        .on("ExitCode", Session::parse_exit_code)
        .once("ArpEntry", Session::parse_arp_entry)
});

// ============================================================================
// Packages
// ============================================================================

#[derive(Default)]
struct PackageAttributes {
    id: Option<Identifier>,
    after: Option<String>,
    cache: Option<CacheType>,
    cache_id: Option<String>,
    description: Option<String>,
    display_name: Option<String>,
    install_condition: Option<String>,
    log_path_variable: Option<String>,
    rollback_log_path_variable: Option<String>,
    permanent: Option<bool>,
    vital: Option<bool>,
    visible: Option<bool>,
    per_machine: Option<YesNoDefault>,
    display_internal_ui: Option<bool>,
    enable_feature_selection: Option<bool>,
    force_per_machine: Option<bool>,
    suppress_loose_file_payload_generation: Option<bool>,
    slipstream: Option<bool>,
    kb: Option<String>,
    detect_condition: Option<String>,
    protocol: Option<ExeProtocol>,
    repair_condition: Option<String>,
    install_arguments: Option<String>,
    repair_arguments: Option<String>,
    uninstall_arguments: Option<String>,
}

impl Session {
    pub(super) fn parse_msi_package(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        self.parse_chain_package(PackageKind::Msi, element, scope)
    }

    pub(super) fn parse_msp_package(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        self.parse_chain_package(PackageKind::Msp, element, scope)
    }

    pub(super) fn parse_msu_package(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        self.parse_chain_package(PackageKind::Msu, element, scope)
    }

    pub(super) fn parse_exe_package(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        self.parse_chain_package(PackageKind::Exe, element, scope)
    }

    pub(super) fn parse_bundle_package(
        &mut self,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        self.parse_chain_package(PackageKind::Bundle, element, scope)
    }

    /// Shared handler for every chain package kind.
    fn parse_chain_package(
        &mut self,
        kind: PackageKind,
        element: Element<'_>,
        scope: &mut Scope,
    ) -> Result<()> {
        let caps = capabilities(kind);
        let strict = EmptyRule::MustHaveNonWhitespaceCharacters;
        let mut payload = PayloadBuilder::new(kind);
        let mut a = PackageAttributes::default();
        let mut deferred = Vec::new();

        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            let name = attr.local_name();
            if !caps.allows_attribute(name) {
                self.unexpected_attribute(element, attr);
                continue;
            }
            if payload.parse_inline_attribute(self, element, attr) {
                continue;
            }
            match name {
                "Id" => a.id = Some(self.identifier_value(element, attr)),
                "After" => a.after = self.reference_value(element, attr),
                "Cache" => {
                    a.cache = self.enum_value(
                        element,
                        attr,
                        &[
                            ("force", CacheType::Force),
                            ("keep", CacheType::Keep),
                            ("remove", CacheType::Remove),
                        ],
                    )
                }
                "CacheId" => a.cache_id = self.string_value(element, attr, strict),
                "Description" => a.description = self.string_value(element, attr, strict),
                "DisplayName" => a.display_name = self.string_value(element, attr, strict),
                "InstallCondition" => {
                    a.install_condition = self.string_value(element, attr, strict)
                }
                "LogPathVariable" => {
                    a.log_path_variable = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "RollbackLogPathVariable" => {
                    a.rollback_log_path_variable =
                        self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "Permanent" => a.permanent = self.yes_no(element, attr),
                "Vital" => a.vital = self.yes_no(element, attr),
                "Visible" => a.visible = self.yes_no(element, attr),
                "PerMachine" => a.per_machine = self.yes_no_default(element, attr),
                "DisplayInternalUI" => a.display_internal_ui = self.yes_no(element, attr),
                "EnableFeatureSelection" => a.enable_feature_selection = self.yes_no(element, attr),
                "ForcePerMachine" => a.force_per_machine = self.yes_no(element, attr),
                "SuppressLooseFilePayloadGeneration" => {
                    a.suppress_loose_file_payload_generation = self.yes_no(element, attr)
                }
                "Slipstream" => a.slipstream = self.yes_no(element, attr),
                "KB" => a.kb = self.string_value(element, attr, strict),
                "DetectCondition" => a.detect_condition = self.string_value(element, attr, strict),
                "Protocol" => {
                    a.protocol = self.enum_value(
                        element,
                        attr,
                        &[
                            ("none", ExeProtocol::None),
                            ("burn", ExeProtocol::Burn),
                            ("netfx4", ExeProtocol::Netfx4),
                        ],
                    )
                }
                "RepairCondition" => a.repair_condition = self.string_value(element, attr, strict),
                "InstallArguments" => {
                    a.install_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "RepairArguments" => {
                    a.repair_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "UninstallArguments" => {
                    a.uninstall_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty)
                }
                "InstallCommand" => {
                    self.deprecated_attribute(element, attr, "InstallArguments");
                    a.install_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty);
                }
                "RepairCommand" => {
                    self.deprecated_attribute(element, attr, "RepairArguments");
                    a.repair_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty);
                }
                "UninstallCommand" => {
                    self.deprecated_attribute(element, attr, "UninstallArguments");
                    a.uninstall_arguments = self.string_value(element, attr, EmptyRule::CanBeEmpty);
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }

        // The typed payload element contributes to the identifiers, so it is
        // read before anything is registered.
        let typed_payload = kind.payload_element_name();
        if let Some(child) = element
            .children()
            .find(|c| c.is_core() && c.local_name() == typed_payload)
        {
            payload.parse_nested(self, element, child);
        }
        let resolved = payload.finalize(self, element, a.id.take());
        let package_id = resolved.package_id;
        let payload_id = resolved.payload_id;

        let after = a.after.take().map(|id| (ComplexReferenceChild::Package, id));
        self.register_child(
            scope.ensure_cursor(),
            ComplexReferenceChild::Package,
            package_id.as_str(),
            after,
        );

        let context = context_map([
            ("Id", package_id.as_str()),
            ("PayloadId", payload_id.as_str()),
        ]);
        self.parse_extension_attributes(element, &deferred, &context);

        let mut payloads =
            OrderingCursor::ordered(ComplexReferenceParent::Package, package_id.as_str());
        self.register_child(
            &mut payloads,
            ComplexReferenceChild::Payload,
            payload_id.as_str(),
            None,
        );
        let mut package_scope = Scope::new(Parent::Package(PackageScope {
            kind,
            id: package_id.id.clone(),
            arp: None,
        }))
        .with_cursor(payloads)
        .with_context(context);

        let mut typed_seen = false;
        self.dispatch_children_with(element, &PACKAGE_CHILDREN, &mut package_scope, |s, child| {
            let name = child.local_name();
            if name == typed_payload {
                if typed_seen {
                    s.too_many_children(element, child);
                }
                typed_seen = true;
                return false;
            }
            if PACKAGE_CHILDREN.get(name).is_some() && !caps.allows_element(name) {
                s.unexpected_element(element, child);
                return false;
            }
            true
        })?;
        let arp = package_scope.ensure_package().arp.take();

        let permanent = a.permanent.unwrap_or(false);
        let per_machine = match kind {
            PackageKind::Exe | PackageKind::Msp => {
                Some(a.per_machine.unwrap_or(YesNoDefault::Default))
            }
            PackageKind::Msu => Some(YesNoDefault::Yes),
            PackageKind::Msi | PackageKind::Bundle => a.per_machine,
        };
        let visible = match kind {
            PackageKind::Msi | PackageKind::Bundle => {
                a.visible.or_else(|| permanent.then_some(true))
            }
            _ => a.visible,
        };

        let details = match kind {
            PackageKind::Msi => PackageDetails::Msi {
                display_internal_ui: a.display_internal_ui.unwrap_or(false),
                enable_feature_selection: a.enable_feature_selection.unwrap_or(false),
                force_per_machine: a.force_per_machine.unwrap_or(false),
                suppress_loose_file_payload_generation: a
                    .suppress_loose_file_payload_generation
                    .unwrap_or(false),
            },
            PackageKind::Msp => PackageDetails::Msp {
                slipstream: a.slipstream.unwrap_or(false),
            },
            PackageKind::Msu => PackageDetails::Msu { kb: a.kb.take() },
            PackageKind::Exe => {
                let detection = self.exe_detection(element, &mut a, arp, permanent);
                PackageDetails::Exe {
                    install_arguments: a.install_arguments,
                    repair_arguments: a.repair_arguments,
                    uninstall_arguments: a.uninstall_arguments,
                    repair_condition: a.repair_condition,
                    protocol: a.protocol.unwrap_or_default(),
                    detection,
                }
            }
            PackageKind::Bundle => PackageDetails::Bundle {
                install_arguments: a.install_arguments,
                repair_arguments: a.repair_arguments,
                uninstall_arguments: a.uninstall_arguments,
            },
        };

        self.emit(payload_id.clone(), SymbolData::Payload(resolved.symbol));
        self.emit(
            package_id,
            SymbolData::Package(PackageSymbol {
                package_kind: kind,
                payload: payload_id.id,
                cache: a.cache.unwrap_or_default(),
                cache_id: a.cache_id,
                description: a.description,
                display_name: a.display_name,
                install_condition: a.install_condition,
                log_path_variable: a.log_path_variable,
                rollback_log_path_variable: a.rollback_log_path_variable,
                permanent,
                vital: a.vital.unwrap_or(true),
                visible,
                per_machine,
                details,
            }),
        );
        Ok(())
    }

    /// How the engine will detect an executable package.
    fn exe_detection(
        &mut self,
        element: Element<'_>,
        a: &mut PackageAttributes,
        arp: Option<ArpEntry>,
        permanent: bool,
    ) -> ExeDetection {
        match (arp, a.detect_condition.take()) {
            (Some(_), Some(_)) => {
                self.mutually_exclusive(element, "DetectCondition", "ArpEntry");
                ExeDetection::None
            }
            (Some(arp), None) => ExeDetection::Arp {
                id: arp.id.unwrap_or_default(),
                version: arp.version.unwrap_or_default(),
                win64: arp.win64,
            },
            (None, Some(condition)) => {
                // Permanent packages are never removed.
                if a.uninstall_arguments.is_none() && !permanent {
                    self.missing_attribute(element, "UninstallArguments");
                }
                ExeDetection::Condition { condition }
            }
            (None, None) => {
                if !permanent {
                    self.expected_attribute_or_element(element, "DetectCondition", "ArpEntry");
                }
                ExeDetection::None
            }
        }
    }

    // ========================================================================
    // Package children
    // ========================================================================

    fn parse_msi_property(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let package = scope.ensure_package().id.clone();
        let mut name = None;
        let mut value = None;
        let mut condition = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Name" => {
                    name = self.string_value(
                        element,
                        attr,
                        EmptyRule::MustHaveNonWhitespaceCharacters,
                    )
                }
                "Value" => value = self.string_value(element, attr, EmptyRule::CanBeEmpty),
                "Condition" => {
                    condition =
                        self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }
        for required in ["Name", "Value"] {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }

        let name = name.unwrap_or_default();
        let id = Identifier::global(generate_identifier("mpp", &[&package, &name]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::MsiProperty(MsiPropertySymbol {
                package,
                name,
                value: value.unwrap_or_default(),
                condition,
            }),
        );
        Ok(())
    }

    fn parse_slipstream_msp(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let package = scope.ensure_package().id.clone();
        let mut msp = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => msp = self.reference_value(element, attr),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if element.attribute("Id").is_none() {
            self.missing_attribute(element, "Id");
        }

        let msp_package = msp.unwrap_or_default();
        self.create_simple_reference(SymbolKind::Package, &msp_package);
        let id = Identifier::global(generate_identifier("sls", &[&package, &msp_package]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::SlipstreamMsp(SlipstreamMspSymbol {
                package,
                msp_package,
            }),
        );
        Ok(())
    }

    fn parse_exit_code(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let package = scope.ensure_package().id.clone();
        let mut code = None;
        let mut behavior = None;
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Value" => code = self.integer(element, attr, i32::MIN, i32::MAX),
                "Behavior" => {
                    behavior = self.enum_value(
                        element,
                        attr,
                        &[
                            ("success", ExitCodeBehavior::Success),
                            ("error", ExitCodeBehavior::Error),
                            ("scheduleReboot", ExitCodeBehavior::ScheduleReboot),
                            ("forceReboot", ExitCodeBehavior::ForceReboot),
                        ],
                    )
                }
                _ => self.unexpected_attribute(element, attr),
            }
        }
        if element.attribute("Behavior").is_none() {
            self.missing_attribute(element, "Behavior");
        }

        let discriminator = code.map_or_else(|| "*".to_owned(), |c| c.to_string());
        let id = Identifier::global(generate_identifier("ec", &[&package, &discriminator]));
        self.finish_leaf(element, &deferred, &id);
        self.emit(
            id,
            SymbolData::ExitCode(ExitCodeSymbol {
                package,
                code,
                behavior: behavior.unwrap_or(ExitCodeBehavior::Success),
            }),
        );
        Ok(())
    }

    /// Add/Remove Programs detection for an executable package. Recorded on
    /// the package, no symbol of its own.
    fn parse_arp_entry(&mut self, element: Element<'_>, scope: &mut Scope) -> Result<()> {
        let mut entry = ArpEntry {
            id: None,
            version: None,
            win64: false,
        };
        let mut deferred = Vec::new();
        for attr in element.attributes() {
            if !attr.is_core() {
                deferred.push(attr);
                continue;
            }
            match attr.local_name() {
                "Id" => {
                    entry.id =
                        self.string_value(element, attr, EmptyRule::MustHaveNonWhitespaceCharacters)
                }
                "Version" => entry.version = self.version(element, attr),
                "Win64" => entry.win64 = self.yes_no(element, attr).unwrap_or(false),
                _ => self.unexpected_attribute(element, attr),
            }
        }
        for required in ["Id", "Version"] {
            if element.attribute(required).is_none() {
                self.missing_attribute(element, required);
            }
        }

        let package = scope.ensure_package();
        let id = Identifier::global(package.id.clone());
        package.arp = Some(entry);
        self.finish_leaf(element, &deferred, &id);
        Ok(())
    }
}

use indoc::indoc;
use wixc_core::PackageKind;

use super::package::capabilities;
use crate::CompileOutput;
use crate::test_utils::{compile, messages, wix};
use crate::{shot_error, shot_intermediate};

/// Field of the package symbol `id`.
fn package_field(output: &CompileOutput, id: &str, name: &str) -> Option<String> {
    output
        .intermediate()
        .symbols()
        .iter()
        .find(|s| s.id.id == id && s.kind() == wixc_core::SymbolKind::Package)
        .and_then(|s| s.data.fields().get(name).cloned())
}

#[test]
fn capability_tables() {
    let msi = capabilities(PackageKind::Msi);
    assert!(msi.allows_attribute("SourceFile"));
    assert!(msi.allows_attribute("DisplayInternalUI"));
    assert!(!msi.allows_attribute("DetectCondition"));
    assert!(msi.allows_element("SlipstreamMsp"));
    assert!(!msi.allows_element("ExitCode"));

    let exe = capabilities(PackageKind::Exe);
    assert!(exe.allows_attribute("InstallCommand"));
    assert!(exe.allows_element("ArpEntry"));
    assert!(!exe.allows_attribute("Visible"));

    let msu = capabilities(PackageKind::Msu);
    assert!(msu.allows_attribute("KB"));
    assert!(msu.allows_element("Payload"));
    assert!(!msu.allows_element("MsiProperty"));
}

#[test]
fn inline_payload() {
    shot_intermediate!(r#"
        <Fragment Id="Packages">
          <PackageGroup Id="G">
            <MsiPackage Id="Core" SourceFile="bin\core.msi" Compressed="no" DisplayName="Core" />
          </PackageGroup>
        </Fragment>
    "#, @r"
    section Fragment Packages
      Payload Core name=core.msi sourceFile=bin\core.msi compressed=false remote=false
      Package Core packageKind=Msi payload=Core cache=keep displayName=Core permanent=false vital=true details.type=msi details.displayInternalUi=false details.enableFeatureSelection=false details.forcePerMachine=false details.suppressLooseFilePayloadGeneration=false
      PackageGroup G
    group PackageGroup:G -> Package:Core
    group Package:Core -> Payload:Core
    ");
}

#[test]
fn nested_remote_payload() {
    shot_intermediate!(r#"
        <Fragment Id="Packages">
          <PackageGroup Id="G">
            <ExePackage Id="Tool" DetectCondition="ToolFound" UninstallArguments="/u">
              <ExePackagePayload Id="ToolPayload" Name="tool.exe" DownloadUrl="https://example.com/tool.exe"
                                 Hash="abc123" Size="1024" />
            </ExePackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    section Fragment Packages
      Payload ToolPayload name=tool.exe downloadUrl=https://example.com/tool.exe hash=abc123 size=1024 remote=true
      Package Tool packageKind=Exe payload=ToolPayload cache=keep permanent=false vital=true perMachine=default details.type=exe details.uninstallArguments=/u details.protocol=none details.detection.strategy=condition details.detection.condition=ToolFound
      PackageGroup G
    group PackageGroup:G -> Package:Tool
    group Package:Tool -> Payload:ToolPayload
    ");
}

#[test]
fn package_id_from_nested_payload_name() {
    let output = compile(&wix(indoc! {r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsuPackage KB="KB2999226">
              <MsuPackagePayload SourceFile="updates\Windows6.1-KB2999226-x64.msu" />
            </MsuPackage>
          </PackageGroup>
        </Fragment>
    "#}));
    assert!(output.is_success(), "{}", messages(&output));
    let id = "windows6.1_kb2999226_x64.msu";
    assert_eq!(package_field(&output, id, "payload").as_deref(), Some(id));
    assert_eq!(package_field(&output, id, "perMachine").as_deref(), Some("yes"));
    assert_eq!(package_field(&output, id, "details.kb").as_deref(), Some("KB2999226"));
}

#[test]
fn payload_in_both_forms() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core" SourceFile="core.msi">
              <MsiPackagePayload SourceFile="other.msi" />
            </MsiPackage>
          </PackageGroup>
        </Fragment>
    "#, @"error: element conflicts with attribute: `MsiPackagePayload` cannot be combined with `MsiPackage/@SourceFile`");
}

#[test]
fn payload_in_neither_form() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core" />
          </PackageGroup>
        </Fragment>
    "#, @"error: expected an attribute or a child element: `MsiPackage/@SourceFile` or a `MsiPackagePayload` child");
}

#[test]
fn second_typed_payload() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core">
              <MsiPackagePayload SourceFile="core.msi" />
              <MsiPackagePayload SourceFile="again.msi" />
            </MsiPackage>
          </PackageGroup>
        </Fragment>
    "#, @"error: `MsiPackage/MsiPackagePayload` may appear only once");
}

#[test]
fn remote_payload_needs_companions() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <ExePackage Id="Tool" Permanent="yes">
              <ExePackagePayload Name="tool.exe" DownloadUrl="https://example.com/tool.exe" Hash="abc123" />
            </ExePackage>
          </PackageGroup>
        </Fragment>
    "#, @"error: `ExePackagePayload/@Size` is required");
}

#[test]
fn remote_and_local_payload() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <ExePackage Id="Tool" Permanent="yes">
              <ExePackagePayload SourceFile="tool.exe" Hash="abc123" />
            </ExePackage>
          </PackageGroup>
        </Fragment>
    "#, @"error: attributes cannot be used together: `ExePackagePayload/@SourceFile` and `ExePackagePayload/@Hash`");
}

#[test]
fn msi_payloads_are_never_remote() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core">
              <MsiPackagePayload Name="core.msi" Hash="abc123" Compressed="yes" />
            </MsiPackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    error: unexpected attribute `MsiPackagePayload/@Hash`
    error: unexpected attribute `MsiPackagePayload/@Compressed`
    ");
}

#[test]
fn kind_specific_attributes_and_children() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsuPackage Id="Update" SourceFile="kb.msu" Visible="yes" DetectCondition="Found">
              <ExitCode Value="1" Behavior="error" />
              <MsiProperty Name="A" Value="B" />
              <Dialog Id="X" />
            </MsuPackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    error: unexpected attribute `MsuPackage/@Visible`
    error: unexpected attribute `MsuPackage/@DetectCondition`
    error: unexpected element `MsuPackage/ExitCode`
    error: unexpected element `MsuPackage/MsiProperty`
    error: unexpected element `MsuPackage/Dialog`
    ");
}

#[test]
fn msi_package_children() {
    shot_intermediate!(r#"
        <Fragment Id="Packages">
          <PackageGroup Id="G">
            <MsiPackage Id="Core" SourceFile="core.msi" Permanent="yes">
              <MsiProperty Name="INSTALLDIR" Value="[InstallFolder]" />
              <SlipstreamMsp Id="Hotfix" />
              <Payload Id="Cab" SourceFile="core.cab" />
            </MsiPackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    section Fragment Packages
      MsiProperty mpp* package=Core name=INSTALLDIR value=[InstallFolder]
      SlipstreamMsp sls* package=Core mspPackage=Hotfix
      Payload Cab name=core.cab sourceFile=core.cab remote=false
      Payload Core name=core.msi sourceFile=core.msi remote=false
      Package Core packageKind=Msi payload=Core cache=keep permanent=true vital=true visible=true details.type=msi details.displayInternalUi=false details.enableFeatureSelection=false details.forcePerMachine=false details.suppressLooseFilePayloadGeneration=false
      PackageGroup G
    ref Package:Hotfix
    group PackageGroup:G -> Package:Core
    group Package:Core -> Payload:Core
    group Package:Core -> Payload:Cab after Payload:Core
    ");
}

#[test]
fn package_child_requirements() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core" SourceFile="core.msi">
              <MsiProperty Value="x" />
              <SlipstreamMsp />
            </MsiPackage>
            <ExePackage Id="Tool" SourceFile="tool.exe" Permanent="yes">
              <ExitCode Value="big" />
              <ArpEntry Win64="yes" />
              <ArpEntry Id="Tool" Version="1.0" />
            </ExePackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    error: `MsiProperty/@Name` is required
    error: `SlipstreamMsp/@Id` is required
    error: illegal attribute value: `ExitCode/@Value` is `big`; expected an integer
    error: `ExitCode/@Behavior` is required
    error: `ArpEntry/@Id` is required
    error: `ArpEntry/@Version` is required
    error: `ExePackage/ArpEntry` may appear only once
    ");
}

#[test]
fn exe_detected_through_arp_entry() {
    shot_intermediate!(r#"
        <Fragment Id="Packages">
          <PackageGroup Id="G">
            <ExePackage Id="Tool" SourceFile="tool.exe" Protocol="burn" PerMachine="yes">
              <ArpEntry Id="AcmeTool" Version="1.2.3" Win64="yes" />
              <ExitCode Value="3010" Behavior="scheduleReboot" />
              <ExitCode Behavior="error" />
            </ExePackage>
          </PackageGroup>
        </Fragment>
    "#, @r"
    section Fragment Packages
      ExitCode ec* package=Tool code=3010 behavior=scheduleReboot
      ExitCode ec* package=Tool behavior=error
      Payload Tool name=tool.exe sourceFile=tool.exe remote=false
      Package Tool packageKind=Exe payload=Tool cache=keep permanent=false vital=true perMachine=yes details.type=exe details.protocol=burn details.detection.strategy=arp details.detection.id=AcmeTool details.detection.version=1.2.3 details.detection.win64=true
      PackageGroup G
    group PackageGroup:G -> Package:Tool
    group Package:Tool -> Payload:Tool
    ");
}

#[test]
fn exe_detection_rules() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="G">
            <ExePackage Id="Both" SourceFile="both.exe" DetectCondition="Found">
              <ArpEntry Id="Both" Version="1.0" />
            </ExePackage>
            <ExePackage Id="Neither" SourceFile="neither.exe" />
            <ExePackage Id="NoUninstall" SourceFile="nouninstall.exe" DetectCondition="Found" />
            <ExePackage Id="Removable" SourceFile="removable.exe" DetectCondition="Found" Permanent="no" />
            <ExePackage Id="Kept" SourceFile="kept.exe" DetectCondition="Found" Permanent="yes" />
            <ExePackage Id="Permanent" SourceFile="permanent.exe" Permanent="yes" />
          </PackageGroup>
        </Fragment>
    "#, @r"
    error: attributes cannot be used together: `ExePackage/@DetectCondition` and `ExePackage/@ArpEntry`
    error: expected an attribute or a child element: `ExePackage/@DetectCondition` or a `ArpEntry` child
    error: `ExePackage/@UninstallArguments` is required
    error: `ExePackage/@UninstallArguments` is required
    ");
}

#[test]
fn deprecated_command_attributes() {
    let output = compile(&wix(indoc! {r#"
        <Fragment>
          <PackageGroup Id="G">
            <ExePackage Id="Tool" SourceFile="tool.exe" DetectCondition="Found"
                        InstallCommand="/quiet" UninstallCommand="/uninstall" />
          </PackageGroup>
        </Fragment>
    "#}));
    assert!(output.is_success());
    insta::assert_snapshot!(messages(&output), @r"
    warning: deprecated: `ExePackage/@InstallCommand` is deprecated; use `ExePackage/@InstallArguments`
    warning: deprecated: `ExePackage/@UninstallCommand` is deprecated; use `ExePackage/@UninstallArguments`
    ");
    assert_eq!(
        package_field(&output, "Tool", "details.installArguments").as_deref(),
        Some("/quiet")
    );
    assert_eq!(
        package_field(&output, "Tool", "details.uninstallArguments").as_deref(),
        Some("/uninstall")
    );
}

#[test]
fn per_machine_and_visibility_defaults() {
    let output = compile(&wix(indoc! {r#"
        <Fragment>
          <PackageGroup Id="G">
            <MspPackage Id="Patch" SourceFile="patch.msp" />
            <BundlePackage Id="Inner" SourceFile="inner.exe" Permanent="yes" />
            <BundlePackage Id="Shown" SourceFile="shown.exe" Permanent="yes" Visible="no" />
            <MsuPackage Id="Update" SourceFile="kb.msu" PerMachine="no" />
          </PackageGroup>
        </Fragment>
    "#}));
    insta::assert_snapshot!(messages(&output), @"error: unexpected attribute `MsuPackage/@PerMachine`");

    let output = compile(&wix(indoc! {r#"
        <Fragment>
          <PackageGroup Id="G">
            <MspPackage Id="Patch" SourceFile="patch.msp" />
            <BundlePackage Id="Inner" SourceFile="inner.exe" Permanent="yes" />
            <BundlePackage Id="Shown" SourceFile="shown.exe" Permanent="yes" Visible="no" />
          </PackageGroup>
        </Fragment>
    "#}));
    assert!(output.is_success(), "{}", messages(&output));
    let field = |id: &str, name: &str| package_field(&output, id, name);
    assert_eq!(field("Patch", "perMachine").as_deref(), Some("default"));
    assert_eq!(field("Inner", "visible").as_deref(), Some("true"));
    assert_eq!(field("Inner", "perMachine"), None);
    assert_eq!(field("Shown", "visible").as_deref(), Some("false"));
}

#[test]
fn extension_attribute_sees_package_context() {
    let output = compile(&wix(indoc! {r#"
        <Fragment>
          <PackageGroup Id="G">
            <MsiPackage Id="Core" SourceFile="core.msi" xmlns:bal="urn:bal" bal:DisplayInternalUICondition="1" />
          </PackageGroup>
        </Fragment>
    "#}));
    assert!(output.is_success());
    insta::assert_snapshot!(messages(&output), @"warning: no extension handles attribute `{urn:bal}DisplayInternalUICondition`");
}

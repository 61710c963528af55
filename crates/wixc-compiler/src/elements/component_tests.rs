use indoc::indoc;
use wixc_core::SymbolKind;

use crate::test_utils::{compile, messages, wix};
use crate::{shot_error, shot_intermediate};

#[test]
fn component_with_registry() {
    shot_intermediate!(r##"
        <Fragment Id="Reg">
          <Component Id="Main" Directory="INSTALLFOLDER" Guid="8c5c8a2e-7d3f-4f27-9c39-0e4c1d2b6a11" Bitness="always64">
            <RegistryKey Root="HKCU" Key="Software\Acme">
              <RegistryValue Name="Installed" Type="integer" Value="#1" KeyPath="yes" />
              <RegistryKey Key="Settings">
                <RegistryValue Id="Theme" Name="Theme" Value="dark" />
              </RegistryKey>
            </RegistryKey>
          </Component>
        </Fragment>
    "##, @r"
    section Fragment Reg
      Registry reg* component=Main root=HKCU key=Software\Acme name=Installed value=#1 valueType=integer keyPath=true
      Registry Theme component=Main root=HKCU key=Software\Acme\Settings name=Theme value=dark valueType=string keyPath=false
      Component Main guid={8C5C8A2E-7D3F-4F27-9C39-0E4C1D2B6A11} directory=INSTALLFOLDER bitness=always64 keyPath=false
    ref Directory:INSTALLFOLDER
    ");
}

#[test]
fn generated_guid_needs_a_database() {
    shot_error!(r#"
        <Fragment>
          <Component Id="Main" Guid="*" />
        </Fragment>
    "#, @r"
    error: illegal attribute value: `Component/@Guid` is `*`; a generated guid needs a package or module being compiled
    error: `Component/@Directory` is required
    ");
}

#[test]
fn database_components_default_their_directory() {
    let output = compile(&wix(indoc! {r#"
        <Package Name="A" Manufacturer="B" Version="1.0">
          <Component Id="Main" Guid="*" />
        </Package>
    "#}));
    assert!(output.is_success(), "{}", messages(&output));
    let component = output
        .intermediate()
        .symbols()
        .iter()
        .find(|s| s.kind() == SymbolKind::Component)
        .expect("component emitted");
    let fields = component.data.fields();
    assert_eq!(fields["guid"], "*");
    assert_eq!(fields["directory"], "INSTALLFOLDER");
    assert!(output
        .intermediate()
        .simple_references()
        .iter()
        .any(|r| r.kind == SymbolKind::Directory && r.id == "INSTALLFOLDER"));
}

#[test]
fn registry_value_needs_root_and_key() {
    shot_error!(r#"
        <Fragment>
          <Component Id="Main" Directory="D">
            <RegistryValue Name="X" Value="1" />
            <RegistryKey Root="HKXX" />
          </Component>
        </Fragment>
    "#, @r"
    error: `RegistryValue/@Root` is required
    error: `RegistryValue/@Key` is required
    error: illegal attribute value: `RegistryKey/@Root` is `HKXX`; expected one of: HKLM, HKCU, HKCR, HKMU, HKU
    error: `RegistryKey/@Key` is required
    ");
}

#[test]
fn registry_integer_values() {
    shot_error!(r#"
        <Fragment>
          <Component Id="Main" Directory="D">
            <RegistryValue Root="HKLM" Key="Software\Acme" Type="integer" Value="lots" />
            <RegistryValue Root="HKLM" Key="Software\Acme" Type="dword" Value="1" />
          </Component>
        </Fragment>
    "#, @r"
    error: illegal attribute value: `RegistryValue/@Value` is `lots`; expected a 32-bit integer
    error: illegal attribute value: `RegistryValue/@Type` is `dword`; expected one of: string, integer, binary, expandable, multiString
    ");
}

#[test]
fn registry_ids_ignore_key_case() {
    let id = |key: &str| {
        let body = format!(
            r#"<Fragment><Component Id="Main" Directory="D"><RegistryValue Root="HKLM" Key="{key}" Name="V" /></Component></Fragment>"#
        );
        compile(&wix(&body)).intermediate().symbols()[0].id.id.clone()
    };
    assert_eq!(id(r"Software\Acme"), id(r"SOFTWARE\acme"));
    assert_ne!(id(r"Software\Acme"), id(r"Software\Other"));
}

#[test]
fn component_children() {
    shot_error!(r#"
        <Fragment>
          <Component Id="Main" Directory="D">
            <Property Id="A" />
          </Component>
        </Fragment>
    "#, @"error: unexpected element `Component/Property`");
}

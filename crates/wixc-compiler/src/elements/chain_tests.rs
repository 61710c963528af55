use indoc::indoc;

use crate::test_utils::{compile, expect_valid, redact, wix};
use crate::{shot_error, shot_intermediate};

/// Chain and group membership lines only.
fn groups(body: &str) -> String {
    expect_valid(&wix(body))
        .lines()
        .filter(|line| {
            line.starts_with("group PackageGroup:") || line.starts_with("group Container:")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn chain_follows_document_order() {
    let output = groups(indoc! {r#"
        <Bundle Id="Setup" Version="1.0">
          <Chain>
            <MsiPackage Id="A" SourceFile="a.msi" />
            <MsiPackage Id="B" SourceFile="b.msi" />
            <MsiPackage Id="C" SourceFile="c.msi" />
          </Chain>
        </Bundle>
    "#});
    insta::assert_snapshot!(output, @r"
    group PackageGroup:WixChain -> Package:A
    group PackageGroup:WixChain -> Package:B after Package:A
    group PackageGroup:WixChain -> Package:C after Package:B
    ");
}

#[test]
fn explicit_after_overrides_one_link() {
    let output = groups(indoc! {r#"
        <Bundle Id="Setup" Version="1.0">
          <Chain>
            <MsiPackage Id="A" SourceFile="a.msi" />
            <MsiPackage Id="B" SourceFile="b.msi" />
            <MsiPackage Id="C" SourceFile="c.msi" After="A" />
            <MsiPackage Id="D" SourceFile="d.msi" />
          </Chain>
        </Bundle>
    "#});
    insta::assert_snapshot!(output, @r"
    group PackageGroup:WixChain -> Package:A
    group PackageGroup:WixChain -> Package:B after Package:A
    group PackageGroup:WixChain -> Package:C after Package:A
    group PackageGroup:WixChain -> Package:D after Package:C
    ");
}

#[test]
fn chain_attributes() {
    shot_intermediate!(r#"
        <Bundle Id="Setup" Version="1.0">
          <Chain DisableRollback="yes" ParallelCache="yes" />
        </Bundle>
    "#, @r"
    section Bundle Setup
      Chain WixChain disableRollback=true disableSystemRestore=false parallelCache=true
      Bundle Setup version=1.0 disableModify=no disableRemove=false
    ");
}

#[test]
fn package_group_and_refs() {
    shot_intermediate!(r#"
        <Fragment Id="Groups">
          <PackageGroup Id="Prereqs">
            <PackageGroupRef Id="NetFx" />
            <PackageGroupRef Id="Vcredist" After="NetFx" />
          </PackageGroup>
        </Fragment>
    "#, @r"
    section Fragment Groups
      PackageGroup Prereqs
    ref PackageGroup:NetFx
    ref PackageGroup:Vcredist
    group PackageGroup:Prereqs -> PackageGroup:NetFx
    group PackageGroup:Prereqs -> PackageGroup:Vcredist after Package:NetFx
    ");
}

#[test]
fn package_group_needs_id() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup>
            <PackageGroupRef />
          </PackageGroup>
        </Fragment>
    "#, @r"
    error: `PackageGroup/@Id` is required
    error: `PackageGroupRef/@Id` is required
    ");
}

#[test]
fn reserved_group_id() {
    shot_error!(r#"
        <Fragment>
          <PackageGroup Id="WixChain" />
        </Fragment>
    "#, @"error: `WixChain` is reserved");
}

#[test]
fn rollback_boundaries() {
    shot_intermediate!(r#"
        <Bundle Id="Setup" Version="1.0">
          <Chain>
            <RollbackBoundary />
            <MsiPackage Id="A" SourceFile="a.msi" Vital="no" Cache="force" />
            <RollbackBoundary Id="Commit" Vital="no" Transaction="yes" LogPathVariable="TxLog" />
          </Chain>
        </Bundle>
    "#, @r"
    section Bundle Setup
      RollbackBoundary rba* vital=true transaction=false
      Payload A name=a.msi sourceFile=a.msi remote=false
      Package A packageKind=Msi payload=A cache=force permanent=false vital=false details.type=msi details.displayInternalUi=false details.enableFeatureSelection=false details.forcePerMachine=false details.suppressLooseFilePayloadGeneration=false
      RollbackBoundary Commit vital=false transaction=true logPathVariable=TxLog
      Chain WixChain disableRollback=false disableSystemRestore=false parallelCache=false
      Bundle Setup version=1.0 disableModify=no disableRemove=false
    group PackageGroup:WixChain -> Package:rba*
    group PackageGroup:WixChain -> Package:A after Package:rba*
    group Package:A -> Payload:A
    group PackageGroup:WixChain -> Package:Commit after Package:A
    ");
}

#[test]
fn boundary_ids_depend_on_position() {
    let ids = |body: &str| -> Vec<String> {
        compile(&wix(body))
            .intermediate()
            .symbols()
            .iter()
            .map(|s| s.id.id.clone())
            .collect()
    };
    let first = ids(r#"<Fragment><PackageGroup Id="G"><RollbackBoundary /><RollbackBoundary /></PackageGroup></Fragment>"#);
    assert_eq!(first.len(), 3);
    assert_ne!(first[0], first[1]);
    assert_eq!(
        first,
        ids(r#"<Fragment><PackageGroup Id="G"><RollbackBoundary /><RollbackBoundary /></PackageGroup></Fragment>"#)
    );
    assert!(redact(&first[0]).starts_with("rba*"));
}

#[test]
fn container_named_from_file() {
    shot_intermediate!(r#"
        <Fragment Id="Web">
          <Container Name="Web Packages.cab" DownloadUrl="https://example.com/{0}">
            <PackageGroupRef Id="Online" />
            <PackageGroupRef Id="Extras" />
          </Container>
        </Fragment>
    "#, @r"
    section Fragment Web
      Container web_packages.cab name=Web Packages.cab containerType=detached downloadUrl=https://example.com/{0}
    ref PackageGroup:Online
    ref PackageGroup:Extras
    group Container:web_packages.cab -> PackageGroup:Online
    group Container:web_packages.cab -> PackageGroup:Extras
    ");
}

#[test]
fn container_problems() {
    shot_error!(r#"
        <Fragment>
          <Container Type="attached" />
          <Container Id="Attached" Type="attached" DownloadUrl="https://example.com/c" />
          <Container Id="Web">
            <PackageGroupRef Id="Online" After="Other" />
          </Container>
        </Fragment>
    "#, @r"
    error: expected at least one of the attributes: `Container` needs one of `Id`, `Name`
    error: attributes cannot be used together: `Container/@Type` and `Container/@DownloadUrl`
    error: unexpected attribute `PackageGroupRef/@After`
    ");
}

#[test]
fn packages_inside_groups() {
    let output = groups(indoc! {r#"
        <Fragment>
          <PackageGroup Id="Prereqs">
            <MsiPackage SourceFile="redist\vc_redist.msi" />
          </PackageGroup>
        </Fragment>
    "#});
    insta::assert_snapshot!(output, @"group PackageGroup:Prereqs -> Package:vc_redist.msi");
}

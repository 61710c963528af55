use wixc_core::symbol::YesNoDefault;

use super::attributes::*;
use crate::test_utils::{compile, messages, wix};
use crate::{Severity, shot_error, shot_intermediate};

#[test]
fn yes_no_is_case_sensitive() {
    assert_eq!(parse_yes_no("yes"), Some(true));
    assert_eq!(parse_yes_no("no"), Some(false));
    assert_eq!(parse_yes_no("Yes"), None);
    assert_eq!(parse_yes_no("true"), None);
    assert_eq!(parse_yes_no_default("default"), Some(YesNoDefault::Default));
    assert_eq!(parse_yes_no_default(""), None);
}

#[test]
fn versions() {
    assert!(is_version("1"));
    assert!(is_version("1.2.3.4"));
    assert!(is_version("4294967295.0"));
    assert!(!is_version("1.2.3.4.5"));
    assert!(!is_version("1..2"));
    assert!(!is_version("4294967296"));
    assert!(!is_version("+1"));
    assert!(!is_version("v1"));
}

#[test]
fn guids_are_normalized() {
    let expected = Some("{8C5C8A2E-7D3F-4F27-9C39-0E4C1D2B6A11}".to_owned());
    assert_eq!(normalize_guid("8c5c8a2e-7d3f-4f27-9c39-0e4c1d2b6a11"), expected);
    assert_eq!(normalize_guid("{8C5C8A2E-7D3F-4F27-9C39-0E4C1D2B6A11}"), expected);
    assert_eq!(normalize_guid("8c5c8a2e7d3f4f279c390e4c1d2b6a11"), expected);
    assert_eq!(normalize_guid("not-a-guid"), None);
}

#[test]
fn codepages() {
    assert_eq!(parse_codepage("1252"), Some(1252));
    assert_eq!(parse_codepage("Windows-1252"), Some(1252));
    assert_eq!(parse_codepage("utf-8"), Some(65001));
    assert_eq!(parse_codepage("65536"), None);
    assert_eq!(parse_codepage("-1"), None);
    assert_eq!(parse_codepage("klingon"), None);
}

#[test]
fn long_filenames() {
    assert!(is_long_filename("Setup Files.exe", false));
    assert!(!is_long_filename("a:b", false));
    assert!(!is_long_filename("..", false));
    assert!(!is_long_filename("   ", false));
    assert!(!is_long_filename(&"a".repeat(260), false));
    assert!(!is_long_filename("redist\\vc.exe", false));
    assert!(is_long_filename("redist\\vc.exe", true));
    assert!(is_long_filename("redist/x64/vc.exe", true));
    assert!(!is_long_filename("redist\\\\vc.exe", true));
}

#[test]
fn short_filenames() {
    assert!(is_short_filename("SETUP.EXE"));
    assert!(is_short_filename("README"));
    assert!(is_short_filename("A~1.TXT"));
    assert!(!is_short_filename("TOOLONGNAME.TXT"));
    assert!(!is_short_filename("NAME.TEXT"));
    assert!(!is_short_filename("A B.TXT"));
    assert!(!is_short_filename(".TXT"));
}

#[test]
fn yes_no_attribute() {
    shot_intermediate!(r#"
        <Fragment Id="Props">
          <Property Id="INSTALLDIR" Value="C:\App" Secure="yes" />
        </Fragment>
    "#, @r"
    section Fragment Props
      Property INSTALLDIR value=C:\App secure=true hidden=false admin=false
    ");
}

#[test]
fn illegal_yes_no_value() {
    shot_error!(r#"
        <Fragment>
          <Property Id="A" Secure="true" />
        </Fragment>
    "#, @"error: illegal attribute value: `Property/@Secure` is `true`; expected one of: yes, no");
}

#[test]
fn empty_yes_no_value() {
    shot_error!(r#"
        <Fragment>
          <Property Id="A" Hidden="" />
        </Fragment>
    "#, @"error: `Property/@Hidden` cannot be empty");
}

#[test]
fn identifier_problems() {
    shot_error!(r#"
        <Fragment>
          <Property Id="1st" />
          <Property Id="public A" />
          <Property Id="WixChain" />
          <Property Id=" " />
        </Fragment>
    "#, @r"
    error: `1st` is not a legal identifier
    error: `public A` is not a legal identifier
    error: `WixChain` is reserved
    error: `Property/@Id` cannot be empty
    ");
}

#[test]
fn access_prefix_is_kept() {
    shot_intermediate!(r#"
        <Fragment Id="Props">
          <Property Id="private Secret" Hidden="yes" />
        </Fragment>
    "#, @r"
    section Fragment Props
      Property private Secret secure=false hidden=true admin=false
    ");
}

#[test]
fn every_bad_attribute_is_reported() {
    let output = compile(&wix(r#"<Fragment><Property Secure="maybe" Admin="1" /></Fragment>"#));
    assert_eq!(output.diagnostics().count(Severity::Error), 3);
    assert!(output.intermediate().is_empty());
    insta::assert_snapshot!(messages(&output), @r"
    error: illegal attribute value: `Property/@Secure` is `maybe`; expected one of: yes, no
    error: illegal attribute value: `Property/@Admin` is `1`; expected one of: yes, no
    error: `Property/@Id` is required
    ");
}

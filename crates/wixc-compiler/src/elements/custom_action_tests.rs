use crate::{shot_error, shot_intermediate};

#[test]
fn dll_from_binary() {
    shot_intermediate!(r#"
        <Fragment Id="Actions">
          <CustomAction Id="CheckLicense" BinaryRef="AcmeCA" DllEntry="CheckLicense"
                        Execute="deferred" Impersonate="no" Return="ignore" />
        </Fragment>
    "#, @r"
    section Fragment Actions
      CustomAction CheckLicense sourceKind=binary source=AcmeCA targetKind=dll target=CheckLicense execute=deferred returnType=ignore impersonate=false hideTarget=false
    ref Binary:AcmeCA
    ");
}

#[test]
fn sources_and_their_references() {
    shot_intermediate!(r#"
        <Fragment Id="Actions">
          <CustomAction Id="SetDir" Property="INSTALLDIR" Value="[ProgramFilesFolder]Acme" />
          <CustomAction Id="RunTool" FileRef="ToolExe" ExeCommand="" Return="asyncNoWait" />
          <CustomAction Id="RunHere" Directory="INSTALLFOLDER" ExeCommand="cmd /c echo" HideTarget="yes" />
        </Fragment>
    "#, @r"
    section Fragment Actions
      CustomAction SetDir sourceKind=property source=INSTALLDIR targetKind=value target=[ProgramFilesFolder]Acme execute=immediate returnType=check impersonate=true hideTarget=false
      CustomAction RunTool sourceKind=file source=ToolExe targetKind=exe target= execute=immediate returnType=asyncNoWait impersonate=true hideTarget=false
      CustomAction RunHere sourceKind=directory source=INSTALLFOLDER targetKind=exe target=cmd /c echo execute=immediate returnType=check impersonate=true hideTarget=true
    ref File:ToolExe
    ref Directory:INSTALLFOLDER
    ");
}

#[test]
fn inline_script() {
    shot_intermediate!(r#"
        <Fragment Id="Actions">
          <CustomAction Id="Hello" Script="vbscript">
            MsgBox "hello"
          </CustomAction>
        </Fragment>
    "#, @r#"
    section Fragment Actions
      CustomAction Hello sourceKind=inlineScript targetKind=vbscript target=MsgBox "hello" execute=immediate returnType=check impersonate=true hideTarget=false
    "#);
}

#[test]
fn source_conflicts() {
    shot_error!(r#"
        <Fragment>
          <CustomAction Id="A" BinaryRef="Bin" FileRef="File" DllEntry="Go" />
          <CustomAction Id="B" DllEntry="Go" ExeCommand="go.exe" BinaryRef="Bin" />
        </Fragment>
    "#, @r"
    error: attributes cannot be used together: `CustomAction/@BinaryRef` and `CustomAction/@FileRef`
    error: attributes cannot be used together: `CustomAction/@DllEntry` and `CustomAction/@ExeCommand`
    ");
}

#[test]
fn missing_source_or_target() {
    shot_error!(r#"
        <Fragment>
          <CustomAction Id="NoSource" DllEntry="Go" />
          <CustomAction Id="NoTarget" BinaryRef="Bin" />
          <CustomAction BinaryRef="Bin" DllEntry="Go" />
        </Fragment>
    "#, @r"
    error: expected at least one of the attributes: `CustomAction` needs one of `BinaryRef`, `FileRef`, `Property`, `Directory`, `Script`
    error: expected at least one of the attributes: `CustomAction` needs one of `DllEntry`, `ExeCommand`, `Value`, `JScriptCall`, `VBScriptCall`
    error: `CustomAction/@Id` is required
    ");
}

#[test]
fn script_rules() {
    shot_error!(r#"
        <Fragment>
          <CustomAction Id="WithTarget" Script="jscript" JScriptCall="main">run()</CustomAction>
          <CustomAction Id="Empty" Script="jscript" />
          <CustomAction Id="Python" Script="python">print()</CustomAction>
        </Fragment>
    "#, @r"
    error: attributes cannot be used together: `CustomAction/@Script` and `CustomAction/@JScriptCall`
    error: illegal attribute value: `CustomAction/@Script` is `jscript`; an inline script needs a body
    error: illegal attribute value: `CustomAction/@Script` is `python`; expected one of: jscript, vbscript
    ");
}

#[test]
fn enumerations() {
    shot_error!(r#"
        <Fragment>
          <CustomAction Id="A" BinaryRef="Bin" DllEntry="Go" Execute="later" Return="maybe" />
        </Fragment>
    "#, @r"
    error: illegal attribute value: `CustomAction/@Execute` is `later`; expected one of: immediate, deferred, rollback, commit, oncePerProcess, firstSequence, secondSequence
    error: illegal attribute value: `CustomAction/@Return` is `maybe`; expected one of: check, ignore, asyncWait, asyncNoWait
    ");
}

use std::{
    error::Error,
    io, str,
    path::Path,
    process::{Command, Output},
};

const WICK_PATH: &str = "./target/debug/wick";

pub struct Expected<'a> {
    pub stdout: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        Ok(())
    }
}

fn run_wick(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(WICK_PATH)
        .arg("--file")
        .arg(src_path)
        .arg("--run")
        .output()
}

/// Run the built `wick` binary against `src_path` and assert its stdout
/// matches `expected`, the way the reference `why` binary's compile-then-run
/// pair was checked, generalized to this interpreter's single `--run` mode.
pub fn check_run(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_wick(src_path)?;

    let stderr = str::from_utf8(&output.stderr)?;
    assert!(stderr.is_empty(), "{stderr}");
    assert!(
        output.status.success(),
        "wick exited with status {:?}",
        output.status.code()
    );

    expected.assert_matches(&output)?;
    Ok(())
}

/// Run the built `wick` binary against `src_path` and assert it exits with a
/// non-zero status (a lex/parse/runtime error was surfaced).
pub fn check_run_fails(src_path: &Path) -> Result<(), Box<dyn Error>> {
    let output = run_wick(src_path)?;

    println!("{output:?}");
    assert!(
        !output.status.success(),
        "wick should have exited with a non-zero status"
    );

    Ok(())
}

use vergen_git2::{BuildBuilder, CargoBuilder, Emitter, Git2Builder, RustcBuilder};

/// Emits the VERGEN_* variables read by `admit --version`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sha = Git2Builder::default().sha(true).build()?;
    let build_date = BuildBuilder::default().build_date(true).build()?;
    let target = CargoBuilder::default().target_triple(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    Emitter::default()
        .add_instructions(&sha)?
        .add_instructions(&build_date)?
        .add_instructions(&target)?
        .add_instructions(&rustc)?
        .emit()?;

    Ok(())
}

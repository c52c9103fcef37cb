use estivador::Pipeline;

fn main() -> anyhow::Result<()> {
    Pipeline::new().run()?;
    Ok(())
}

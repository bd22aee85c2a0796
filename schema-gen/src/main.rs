use heating_payback::input::ProjectInput;
use schemars::schema_for;

fn main() -> anyhow::Result<()> {
    let schema = schema_for!(ProjectInput);
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}

//! The `qtivar init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("qtivar.toml").exists() {
        println!("qtivar.toml already exists, skipping.");
    } else {
        std::fs::write("qtivar.toml", SAMPLE_CONFIG)?;
        println!("Created qtivar.toml");
    }

    std::fs::create_dir_all("declarations")?;
    let example_path = std::path::Path::new("declarations/example.toml");
    if example_path.exists() {
        println!("declarations/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECLARATIONS)?;
        println!("Created declarations/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: qtivar validate --declarations declarations/example.toml");
    println!(
        "  2. Run: qtivar encode --declarations declarations/example.toml --item choice1 --response RESPONSE --value B"
    );
    println!(
        "  3. Run: qtivar status --declarations declarations/example.toml --input responses.xml"
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qtivar configuration

[engine]
directed_pair_delimiter = ":"
gap_prefix = "Gap"
candidate_information_identifier = "candidateInformation"
response_element = "response"
responses_element = "responses"
"#;

const EXAMPLE_DECLARATIONS: &str = r#"custom_responses = ["graph"]

[[items]]
identifier = "choice1"

[[items.responses]]
identifier = "RESPONSE"
cardinality = "single"
base_type = "identifier"
interaction = "choice"

[[items]]
identifier = "gaps1"

[[items.responses]]
identifier = "RESPONSE"
cardinality = "multiple"
base_type = "directedPair"
max_choices = 3
interaction = "gapMatch"

[[items.parameters]]
identifier = "SHUFFLE_SEED"
cardinality = "single"
base_type = "integer"
default = ["42"]

[[items]]
identifier = "hotspot1"

[[items.responses]]
identifier = "POINTS"
cardinality = "ordered"
base_type = "point"
max_choices = 2
interaction = "selectPoint"
"#;

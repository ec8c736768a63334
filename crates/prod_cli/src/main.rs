use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use prod_core::{
    AssemblyStage, Catalog, ComponentManufacturingStage, ProductionStage, Recipe, RefiningStage,
    ResourceId, ResourceMap, SkillMap, DEFAULT_ASSEMBLY_COST_PER_HOUR,
    DEFAULT_MANUFACTURING_COST_PER_HOUR, DEFAULT_REFINING_COST_PER_HOUR, DEFAULT_TECH_LEVEL,
};
use prod_world::load_catalog;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "prod_cli", about = "Production chain CLI")]
struct Cli {
    #[arg(long, default_value = "./content", global = true)]
    content_dir: String,
    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every subcommand that runs a stage.
#[derive(Args)]
struct RunArgs {
    /// Input resources as a JSON object of id → quantity, e.g. '{"0": 10.0}'.
    #[arg(long)]
    input: String,
    #[arg(long, default_value_t = 1.0)]
    equipment_quality: f64,
    /// Skill levels as a JSON object of name → level. Mutually exclusive with --skills-file.
    #[arg(long, conflicts_with = "skills_file")]
    skills: Option<String>,
    /// Read skill levels from a JSON file. Mutually exclusive with --skills.
    #[arg(long)]
    skills_file: Option<String>,
    #[arg(long, default_value_t = 1.0)]
    batch_size: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum StageArg {
    Refining,
    Manufacturing,
    Assembly,
}

#[derive(Subcommand)]
enum Commands {
    /// Refine ores into minerals.
    Refine {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Manufacture one component, or every component the minerals allow.
    Manufacture {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        target: Option<ResourceId>,
    },
    /// Assemble one finished good, or every good the components allow.
    Assemble {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long)]
        target: Option<ResourceId>,
        #[arg(long, default_value_t = DEFAULT_TECH_LEVEL)]
        tech_level: u32,
    },
    /// Expected output of an input at average efficiency.
    Preview {
        #[arg(long, value_enum)]
        stage: StageArg,
        #[arg(long)]
        input: String,
        #[arg(long, default_value_t = DEFAULT_TECH_LEVEL)]
        tech_level: u32,
    },
    /// Inputs needed for a quantity of output at average efficiency.
    Require {
        #[arg(long, value_enum)]
        stage: StageArg,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        target: Option<ResourceId>,
    },
    /// Catalog details, batch sizing and cost estimate for one entry.
    Info {
        #[arg(long, value_enum)]
        stage: StageArg,
        #[arg(long)]
        id: ResourceId,
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(long, default_value_t = 1.0)]
        equipment_quality: f64,
    },
    /// Run fabricator recipes from a JSON file for a duration in seconds.
    Recipes {
        #[arg(long)]
        recipes: String,
        #[arg(long)]
        materials: String,
        #[arg(long)]
        duration: f64,
    },
    /// Ores → minerals → components → finished goods, each stage fed the
    /// previous stage's products.
    Chain {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value_t = DEFAULT_TECH_LEVEL)]
        tech_level: u32,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Stages {
    refinery: RefiningStage,
    fabricator: ComponentManufacturingStage,
    assembler: AssemblyStage,
}

impl Stages {
    fn new(catalog: &Arc<Catalog>) -> Self {
        Self {
            refinery: RefiningStage::new(Arc::clone(catalog)),
            fabricator: ComponentManufacturingStage::new(Arc::clone(catalog)),
            assembler: AssemblyStage::new(Arc::clone(catalog)),
        }
    }

    fn get(&self, stage: StageArg) -> &dyn ProductionStage {
        match stage {
            StageArg::Refining => &self.refinery,
            StageArg::Manufacturing => &self.fabricator,
            StageArg::Assembly => &self.assembler,
        }
    }
}

fn parse_json<T: DeserializeOwned>(what: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).with_context(|| format!("parsing {what}"))
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    parse_json(path, &text)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("serializing output")?
    );
    Ok(())
}

struct RunInputs {
    input: ResourceMap,
    equipment_quality: f64,
    skills: SkillMap,
    batch_size: f64,
}

impl RunArgs {
    fn resolve(&self) -> Result<RunInputs> {
        ensure!(
            (0.0..=1.0).contains(&self.equipment_quality),
            "--equipment-quality must be within [0, 1], got {}",
            self.equipment_quality
        );
        let skills = match (&self.skills, &self.skills_file) {
            (Some(text), _) => parse_json("--skills", text)?,
            (None, Some(path)) => read_json(path)?,
            (None, None) => SkillMap::new(),
        };
        Ok(RunInputs {
            input: parse_json("--input", &self.input)?,
            equipment_quality: self.equipment_quality,
            skills,
            batch_size: self.batch_size,
        })
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn require(
    stages: &Stages,
    stage: StageArg,
    quantity: f64,
    target: Option<ResourceId>,
) -> Result<ResourceMap> {
    let required = match (stage, target) {
        (StageArg::Refining, Some(_)) => bail!("refining takes no --target"),
        (StageArg::Manufacturing, Some(id)) => {
            stages.fabricator.required_resources_for(quantity, id)
        }
        (StageArg::Assembly, Some(id)) => stages.assembler.required_resources_for(quantity, id),
        (_, None) => stages.get(stage).required_resources(quantity),
    };
    Ok(required)
}

fn entry_info(
    stages: &Stages,
    stage: StageArg,
    id: ResourceId,
    quantity: f64,
    equipment_quality: f64,
) -> Result<serde_json::Value> {
    let value = match stage {
        StageArg::Refining => {
            let refinery = &stages.refinery;
            let details = refinery
                .refining_info(id)
                .with_context(|| format!("unknown ore id {id}"))?;
            json!({
                "info": details,
                "optimal_batch_size": refinery.optimal_batch_size(&[id]),
                "estimated_cost": refinery.estimate_refining_cost(
                    &ResourceMap::from([(id, quantity)]),
                    equipment_quality,
                    DEFAULT_REFINING_COST_PER_HOUR,
                ),
            })
        }
        StageArg::Manufacturing => {
            let fabricator = &stages.fabricator;
            let details = fabricator
                .manufacturing_info(id)
                .with_context(|| format!("unknown component id {id}"))?;
            json!({
                "info": details,
                "optimal_batch_size": fabricator.optimal_batch_size(id),
                "estimated_cost": fabricator.estimate_manufacturing_cost(
                    id,
                    quantity,
                    equipment_quality,
                    DEFAULT_MANUFACTURING_COST_PER_HOUR,
                ),
            })
        }
        StageArg::Assembly => {
            let assembler = &stages.assembler;
            let details = assembler
                .assembly_info(id)
                .with_context(|| format!("unknown finished good id {id}"))?;
            json!({
                "info": details,
                "optimal_batch_size": assembler.optimal_batch_size(id),
                "estimated_cost": assembler.estimate_assembly_cost(
                    id,
                    quantity,
                    equipment_quality,
                    DEFAULT_ASSEMBLY_COST_PER_HOUR,
                ),
            })
        }
    };
    Ok(json!({ "stage": stages.get(stage).stage_info(), "entry": value }))
}

fn run_recipes(
    catalog: &Arc<Catalog>,
    recipes_file: &str,
    materials: &str,
    duration: f64,
) -> Result<serde_json::Value> {
    let recipes: BTreeMap<ResourceId, Recipe> = read_json(recipes_file)?;
    let materials: ResourceMap = parse_json("--materials", materials)?;
    let mut fabricator = ComponentManufacturingStage::new(Arc::clone(catalog));
    for (component_id, recipe) in recipes {
        fabricator.add_recipe(component_id, recipe);
    }
    let names: BTreeMap<ResourceId, String> = fabricator
        .recipes()
        .keys()
        .map(|id| (*id, fabricator.component_name(*id)))
        .collect();
    let output = fabricator.process_by_recipe(&materials, duration);
    Ok(json!({
        "production_info": fabricator.production_info(),
        "recipes": names,
        "output": output,
    }))
}

fn chain(stages: &Stages, run: &RunInputs, tech_level: u32) -> serde_json::Value {
    let skills = &run.skills;
    let refined = stages
        .refinery
        .process(&run.input, run.equipment_quality, skills, run.batch_size);
    info!(result = ?refined.result(), "refining: {}", refined.message());
    let components = stages.fabricator.process(
        refined.products(),
        run.equipment_quality,
        skills,
        run.batch_size,
    );
    info!(result = ?components.result(), "manufacturing: {}", components.message());
    let goods = stages.assembler.assemble(
        components.products(),
        run.equipment_quality,
        skills,
        run.batch_size,
        None,
        tech_level,
    );
    info!(result = ?goods.result(), "assembly: {}", goods.message());
    json!({
        "refining": refined,
        "manufacturing": components,
        "assembly": goods,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = Arc::new(load_catalog(&cli.content_dir)?);
    let stages = Stages::new(&catalog);

    match cli.command {
        Commands::Refine { run } => {
            let run = run.resolve()?;
            print_json(&stages.refinery.process(
                &run.input,
                run.equipment_quality,
                &run.skills,
                run.batch_size,
            ))?;
        }
        Commands::Manufacture { run, target } => {
            let run = run.resolve()?;
            print_json(&stages.fabricator.manufacture(
                &run.input,
                run.equipment_quality,
                &run.skills,
                run.batch_size,
                target,
            ))?;
        }
        Commands::Assemble {
            run,
            target,
            tech_level,
        } => {
            let run = run.resolve()?;
            print_json(&stages.assembler.assemble(
                &run.input,
                run.equipment_quality,
                &run.skills,
                run.batch_size,
                target,
                tech_level,
            ))?;
        }
        Commands::Preview {
            stage,
            input,
            tech_level,
        } => {
            let input: ResourceMap = parse_json("--input", &input)?;
            let expected = match stage {
                StageArg::Assembly => stages.assembler.expected_output_at(&input, tech_level),
                StageArg::Refining | StageArg::Manufacturing => {
                    stages.get(stage).expected_output(&input)
                }
            };
            print_json(&expected)?;
        }
        Commands::Require {
            stage,
            quantity,
            target,
        } => print_json(&require(&stages, stage, quantity, target)?)?,
        Commands::Info {
            stage,
            id,
            quantity,
            equipment_quality,
        } => print_json(&entry_info(&stages, stage, id, quantity, equipment_quality)?)?,
        Commands::Recipes {
            recipes: recipes_file,
            materials,
            duration,
        } => print_json(&run_recipes(&catalog, &recipes_file, &materials, duration)?)?,
        Commands::Chain { run, tech_level } => {
            let run = run.resolve()?;
            print_json(&chain(&stages, &run, tech_level))?;
        }
    }
    Ok(())
}

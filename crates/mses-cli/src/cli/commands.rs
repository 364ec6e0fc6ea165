use super::CliError;
use super::helpers::{fit_component, load_displacement_file, resolve_config};
use anyhow::Context;
use mses_core::domain::{MsesError, PolarDriver};
use mses_core::mdat::{SolutionData, decode_solution_file_with};
use mses_core::projection::{FunctionalDerivatives, ProjectionSession};
use mses_core::sensx::{SensitivityData, decode_sensitivity_file_with};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct SensxArgs {
    /// sensx file to decode
    #[arg(value_name = "file")]
    path: PathBuf,

    /// Print the full decoded structure as JSON
    #[arg(long)]
    json: bool,

    /// Run configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct MdatArgs {
    /// mdat file to decode
    #[arg(value_name = "file")]
    path: PathBuf,

    /// Print the full decoded structure as JSON
    #[arg(long)]
    json: bool,

    /// Run configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ProjectArgs {
    /// sensx file providing the shape modes
    #[arg(long)]
    sensx: PathBuf,

    /// Design-variable displacement curves (JSON)
    #[arg(long)]
    displacement: PathBuf,

    /// The polar was converged at fixed CL rather than fixed alpha
    #[arg(long)]
    cl_driven: bool,

    /// Run configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(super) fn run_sensx_command(args: SensxArgs) -> Result<i32, CliError> {
    let config = resolve_config(args.config.as_deref())?;
    let data = decode_sensitivity_file_with(&args.path, &config).map_err(CliError::Compute)?;
    if args.json {
        print_json(&data)?;
    } else {
        println!("Sensitivity file: {}", args.path.display());
        println!("{}", render_sensx_summary(&data));
    }
    Ok(0)
}

pub(super) fn run_mdat_command(args: MdatArgs) -> Result<i32, CliError> {
    let config = resolve_config(args.config.as_deref())?;
    let data = decode_solution_file_with(&args.path, &config).map_err(CliError::Compute)?;
    if args.json {
        print_json(&data)?;
    } else {
        println!("Solution file: {}", args.path.display());
        println!("{}", render_mdat_summary(&data));
    }
    Ok(0)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionReport {
    sensx: String,
    driver: PolarDriver,
    modes: usize,
    components: Vec<ComponentReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentReport {
    index: usize,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    derivatives: Option<FunctionalDerivatives>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ComponentFailure>,
}

#[derive(Debug, Serialize)]
struct ComponentFailure {
    placeholder: &'static str,
    message: String,
}

impl From<&MsesError> for ComponentFailure {
    fn from(error: &MsesError) -> Self {
        Self {
            placeholder: error.placeholder(),
            message: error.message().to_string(),
        }
    }
}

pub(super) fn run_project_command(args: ProjectArgs) -> Result<i32, CliError> {
    let config = resolve_config(args.config.as_deref())?;
    let data = decode_sensitivity_file_with(&args.sensx, &config).map_err(CliError::Compute)?;
    let displacement = load_displacement_file(&args.displacement)?;
    let driver = PolarDriver::from_cl_driven(args.cl_driven);

    let session = ProjectionSession::new(&data, driver, &config).map_err(CliError::Compute)?;
    let outcomes = session
        .evaluate_components(displacement.components.iter().map(fit_component))
        .map_err(CliError::Compute)?;

    let failed = outcomes.iter().filter(|outcome| outcome.result.is_err()).count();
    info!(
        components = outcomes.len(),
        failed, "design-variable projection complete"
    );

    let components = outcomes
        .iter()
        .map(|outcome| ComponentReport {
            index: outcome.index,
            name: displacement.components[outcome.index].name.clone(),
            derivatives: outcome.result.as_ref().ok().copied(),
            error: outcome.result.as_ref().err().map(ComponentFailure::from),
        })
        .collect();
    print_json(&ProjectionReport {
        sensx: args.sensx.display().to_string(),
        driver,
        modes: data.mode_count(),
        components,
    })?;

    if failed == 0 { Ok(0) } else { Ok(1) }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

fn render_sensx_summary(data: &SensitivityData) -> String {
    let forces = &data.forces;
    [
        format!("Code: {}  Name: {}", data.code, data.name),
        format!(
            "Bodies: {}  Streamwise points: {}  Modes: {}  Positions: {} ({} decoded)",
            data.body_count(),
            data.sizing.ii,
            data.mode_count(),
            data.sizing.npos,
            data.positions.len()
        ),
        format!(
            "Flow: alpha={}  mach={}  reyn={}",
            data.alfa, data.mach, data.reyn
        ),
        format!(
            "Forces: CL={}  CM={}  CD={}  CDw={}  CDv={}  CDf={}",
            forces.cl,
            forces.cm,
            forces.cd(),
            forces.cdw,
            forces.cdv,
            forces.cdf
        ),
        format!("Lift slope: CL_alpha={} per degree", forces.alfa.cl),
    ]
    .join("\n")
}

fn render_mdat_summary(data: &SolutionData) -> String {
    let flow = &data.flow;
    [
        format!("Code: {}  Name: {}", data.code, data.name),
        format!(
            "Grid: {} x {}  Bodies: {}  Modes: {}  Positions: {}",
            data.sizing.ii,
            data.sizing.jj,
            data.sizing.nbl,
            data.sizing.nmod,
            data.sizing.npos
        ),
        format!(
            "Flow: alpha={}  mach={}  reyn={}  acrit={}",
            flow.alfa, flow.mach, flow.reyn, flow.acrit
        ),
        format!(
            "Forces: CL={}  CM={}  CDw={}  CDv={}  CDf={}",
            flow.cl, flow.cm, flow.cdw, flow.cdv, flow.cdf
        ),
        format!(
            "Frequency entries: {}  Probes: {}",
            data.frequencies.total(),
            data.probes.len()
        ),
    ]
    .join("\n")
}

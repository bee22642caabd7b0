use copperclear::*;
use geo::Rect;

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {}", e);
    }

    let args: Vec<String> = std::env::args().collect();
    let operation = args.get(1).map(|s| s.as_str()).unwrap_or("clear");

    match operation {
        "clear" => demo_clear(),
        "rest" => demo_rest(),
        "isolate" => demo_isolate(),
        _ => {
            println!("Usage: copperclear [clear|rest|isolate]");
            println!("  clear    - Standard clearing around two pads (default)");
            println!("  rest     - Rest machining with a narrow gap");
            println!("  isolate  - Isolation pass before clearing");
        }
    }
}

fn board() -> TargetObject {
    TargetObject::copper(
        "top_copper",
        vec![
            Rect::new((10.0, 10.0), (14.0, 14.0)).to_polygon(),
            Rect::new((14.6, 10.0), (18.6, 14.0)).to_polygon(),
        ],
    )
}

fn selection() -> BoundaryReference {
    BoundaryReference::AreaSelection(vec![Rect::new((0.0, 0.0), (30.0, 25.0))])
}

fn demo_clear() {
    println!("copperclear - Standard Non-Copper Clearing");
    println!("==========================================\n");

    let job = ClearingJob::new("top_ncc", board(), ToolLibrary::from_diameters(&[1.0, 0.5]))
        .with_reference(selection());
    run(&job);
}

fn demo_rest() {
    println!("copperclear - Rest Machining");
    println!("============================\n");

    let config = ClearingConfig {
        rest_machining: true,
        ..Default::default()
    };
    let job = ClearingJob::new("top_ncc_rest", board(), ToolLibrary::from_diameters(&[2.0, 1.0, 0.3]))
        .with_reference(selection())
        .with_config(config);
    run(&job);
}

fn demo_isolate() {
    println!("copperclear - Isolation and Clearing");
    println!("====================================\n");

    let mut tools = ToolLibrary::from_diameters(&[1.0]);
    tools.add_tool(Tool::isolation(0.2));
    let job = ClearingJob::new("top_ncc_iso", board(), tools).with_reference(selection());
    run(&job);
}

fn run(job: &ClearingJob) {
    let progress = |event: ProgressEvent| {
        if let ProgressEvent::Status(status) = event {
            println!("  {}", status);
        }
    };
    let outcome = clear_copper(job, &progress, &CancelToken::new());
    let report = ClearingReport::from_outcome(&job.output_name, &outcome);

    match outcome {
        Ok(result) => {
            for tool in result.tools.values() {
                println!(
                    "Tool {:?} {:.3}: {} path(s)",
                    tool.operation,
                    tool.diameter,
                    tool.cleared_geometry.len()
                );
            }
            for message in &report.warnings {
                println!("{}", message);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
    if let Ok(json) = serde_json::to_string_pretty(&report.summary) {
        println!("\nSummary:\n{}", json);
    }
}

//! `plan` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use contracts::Partition;
use dispatcher::BatchPlanner;

use crate::cli::PlanArgs;

/// Batch plan for JSON output
#[derive(Debug, Serialize)]
pub(crate) struct PlanOutput {
    pub total: usize,
    pub max_batch_size: usize,
    pub workers: usize,
    pub partitions: Vec<Partition>,
}

impl PlanOutput {
    pub(crate) fn new(planner: &BatchPlanner, total: usize) -> Self {
        let partitions = planner.plan(total);
        Self {
            total,
            max_batch_size: planner.max_batch_size(),
            workers: partitions.len(),
            partitions,
        }
    }
}

/// Execute the `plan` command
pub fn run_plan(args: &PlanArgs) -> Result<()> {
    let planner = BatchPlanner::new(args.batch_size).context("Invalid batch size")?;
    let output = PlanOutput::new(&planner, args.total);

    if args.json {
        let json =
            serde_json::to_string_pretty(&output).context("Failed to serialize batch plan")?;
        println!("{}", json);
    } else {
        print_plan(&output);
    }
    Ok(())
}

pub(crate) fn print_plan(output: &PlanOutput) {
    println!(
        "\n{} recipients, at most {} per batch -> {} workers\n",
        output.total, output.max_batch_size, output.workers
    );
    for (worker, partition) in output.partitions.iter().enumerate() {
        println!("  worker {:>3}: {} ({} recipients)", worker, partition, partition.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_output_counts_workers() {
        let planner = BatchPlanner::new(3).unwrap();
        let output = PlanOutput::new(&planner, 7);

        assert_eq!(output.workers, 3);
        assert_eq!(output.partitions.last(), Some(&Partition::new(6, 7)));
    }

    #[test]
    fn test_plan_rejects_zero_batch() {
        let args = PlanArgs {
            total: 5,
            batch_size: 0,
            json: false,
        };
        assert!(run_plan(&args).is_err());
    }

    #[test]
    fn test_plan_output_json_shape() {
        let planner = BatchPlanner::new(10).unwrap();
        let json = serde_json::to_value(PlanOutput::new(&planner, 0)).unwrap();

        assert_eq!(json["workers"], 0);
        assert_eq!(json["partitions"], serde_json::json!([]));
    }
}


mod migration_runs;

pub mod parallelism;

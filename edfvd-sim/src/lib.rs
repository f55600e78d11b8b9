/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Partitioned dual-criticality EDF-VD scheduling simulator.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── ids           – TaskId / JobId / ProcessorId and the IdAllocator
//! ├── task          – periodic task model, Criticality, ModelError
//! ├── job           – job instances and their execution history
//! ├── processor     – one processor of the partitioned platform
//! ├── config/       – YAML scenario parameters
//! ├── memo          – utilization-vector memo store (in-memory / YAML file)
//! ├── workload/     – UUniFast generator and task pool
//! ├── hyperperiod/  – checked LCM / GCD and hyper-period windows
//! ├── partition/    – best-fit decreasing partitioner
//! ├── jobs/         – job factory and aperiodic trial admission
//! ├── scheduler/    – EDF-VD engine and feasibility analysis
//! ├── qos           – QoS score of low-criticality work
//! ├── simulation    – end-to-end scenario pipeline
//! └── report        – report sinks and execution timelines
//! ```

pub mod config;
pub mod hyperperiod;
pub mod ids;
pub mod job;
pub mod jobs;
pub mod memo;
pub mod partition;
pub mod processor;
pub mod qos;
pub mod report;
pub mod scheduler;
pub mod simulation;
pub mod task;
pub mod workload;

use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_serpo"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn setup_sim_dir(name: &str, config_contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    test_dir
}

#[test]
fn fire_workflow() {
    let test_dir = setup_sim_dir(
        "fire_workflow",
        "seed = 7\n\
         max_ticks = 200\n\
         \n\
         [model]\n\
         kind = \"forest-fire\"\n\
         size = 12\n\
         density = 0.6\n",
    );
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);

    run_bin(&["--sim-dir", test_dir_str, "resume", "--run-idx", "0"]);
    run_bin(&["--sim-dir", test_dir_str, "resume", "--run-idx", "1"]);

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    for run_idx in 0..2 {
        let results = test_dir.join(format!("run-{run_idx:04}")).join("results.json");
        assert!(results.is_file(), "missing {results:?}");
    }

    run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000").exists());
    assert!(test_dir.join("config.toml").is_file());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn wealth_workflow() {
    let test_dir = setup_sim_dir(
        "wealth_workflow",
        "seed = 42\n\
         max_ticks = 100\n\
         \n\
         [model]\n\
         kind = \"wealth-transfer\"\n\
         n_agt = 64\n\
         transfer_chance = 0.5\n",
    );
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);

    run_bin(&["--sim-dir", test_dir_str, "resume", "--run-idx", "0"]);
    run_bin(&["--sim-dir", test_dir_str, "resume", "--run-idx", "0"]);

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    let results = test_dir.join("run-0000").join("results.json");
    let contents = fs::read_to_string(&results).expect("failed to read results");
    assert!(contents.contains("gini"));
    assert!(contents.contains("total_wealth"));

    fs::remove_dir_all(&test_dir).ok();
}

use std::{env, fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[arena]\n"
        + "width = 600.0\n"
        + "height = 400.0\n"
        + "\n"
        + "[population]\n"
        + "n_agents = 150\n"
        + "prob_vacc = 0.9\n"
        + "\n"
        + "[dynamics]\n"
        + "seed_interval = 1000\n"
        + "\n"
        + "[output]\n"
        + "n_ticks = 500\n"
        + "ticks_per_frame = 25\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) -> bool {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_contagion"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        if !output.status.success() {
            let stderr_str = String::from_utf8_lossy(&output.stderr);
            eprintln!("binary failed with {args:?}\nstderr:\n{stderr_str}\n");
        }
        output.status.success()
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(run_bin(&["--sim-dir", test_dir_str, "create", "--seed", "7"]));
    assert!(run_bin(&["--sim-dir", test_dir_str, "create"]));

    for run_dir in ["run-0000", "run-0001"] {
        let frames = test_dir.join(run_dir).join("frames.msgpack");
        let len = fs::metadata(&frames)
            .expect("failed to read frames metadata")
            .len();
        assert!(len > 0, "{frames:?} is empty");
    }

    assert!(run_bin(&["--sim-dir", test_dir_str, "clean"]));
    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("run-0001").exists());

    fs::write(&config_path, "[arena]\nwidth = 0.0\n").expect("failed to write config file");
    assert!(!run_bin(&["--sim-dir", test_dir_str, "create"]));

    fs::remove_dir_all(&test_dir).ok();
}

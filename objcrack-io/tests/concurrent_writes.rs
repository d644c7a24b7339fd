use objcrack_io::{run_batch, BatchConfig, CancellationToken, CrackOptions};
use std::fs;
use std::path::{Path, PathBuf};

const SHARED: &str = "# o Shared\ng Shared\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

/// Sources whose first object is named `Shared` and whose second object is unique
fn write_sources(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("source_{:02}.obj", i));
            let text = format!("{}#\n# o Own{}\ng Own{}\nv 1 1 1\nf 4 4 4\n", SHARED, i, i);
            fs::write(&path, text).unwrap();
            path
        })
        .collect()
}

fn partials(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.to_string_lossy().ends_with(".partial"))
        .collect()
}

#[test]
fn shared_output_name_does_not_fail_parallel_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sources(dir.path(), 16);
    let config = BatchConfig::default().with_threads(8);

    for round in 0..10 {
        let report = run_batch(&paths, &CrackOptions::default(), &config, &CancellationToken::new()).unwrap();
        assert!(report.failed.is_empty(), "round {}: {:?}", round, report.failed);
        assert_eq!(report.succeeded.len(), 16);
        assert!(partials(dir.path()).is_empty(), "round {}", round);
    }

    assert_eq!(fs::read_to_string(dir.path().join("Shared.obj")).unwrap(), SHARED);
    for i in 0..16 {
        assert!(dir.path().join(format!("Own{}.obj", i)).exists());
    }
}

#[test]
fn shared_output_name_into_one_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    fs::create_dir(&sources).unwrap();
    let out = dir.path().join("out");
    let paths = write_sources(&sources, 12);

    let options = CrackOptions::default().with_output_dir(&out);
    let config = BatchConfig::default().with_threads(6);
    let report = run_batch(&paths, &options, &config, &CancellationToken::new()).unwrap();

    assert!(report.is_success());
    assert!(partials(&out).is_empty());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 13);
}

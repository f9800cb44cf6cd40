//! Concurrent readers of a published target file only ever observe complete
//! documents.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use elb_discovery::io::publish::write_atomic;
use elb_discovery::validate::validate_document;

fn document(targets: usize) -> String {
    let targets: Vec<String> = (0..targets)
        .map(|idx| format!("\"10.0.{}.{}:80\"", idx / 250, idx % 250 + 1))
        .collect();
    format!(
        "[\n  {{\n    \"targets\": [{}],\n    \"labels\": {{}}\n  }}\n]\n",
        targets.join(", ")
    )
}

#[test]
fn readers_never_see_partial_documents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("targets.json");
    let small = document(1);
    let large = document(5_000);
    write_atomic(&path, small.as_bytes()).expect("seed");

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        let (small, large) = (small.clone(), large.clone());
        thread::spawn(move || {
            let mut reads = 0usize;
            loop {
                let contents = fs::read_to_string(&path).expect("read");
                assert!(contents == small || contents == large, "partial read");
                reads += 1;
                if done.load(Ordering::Relaxed) {
                    break;
                }
            }
            reads
        })
    };

    for round in 0..200 {
        let payload = if round % 2 == 0 { &large } else { &small };
        write_atomic(&path, payload.as_bytes()).expect("publish");
    }
    done.store(true, Ordering::Relaxed);

    assert!(reader.join().expect("reader") > 0);
    validate_document(&fs::read_to_string(&path).expect("read")).expect("valid");
}

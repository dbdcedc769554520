fn main() {
    println!("cargo:rerun-if-changed=proto/jobs.proto");
    prost_build::Config::new()
        .out_dir("src/proto")
        .compile_protos(&["proto/jobs.proto"], &["proto/"])
        .expect("failed to compile proto/jobs.proto");
}

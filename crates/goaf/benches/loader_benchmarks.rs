//! Loader performance benchmarks.
//!
//! Measures table loading across sizes and encodings, and whole-subject assembly.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use goaf::{Converter, MemorySources, TableLoader, TableRegistry};

/// Generate a synthetic goaf basic-info table with the specified number of rows.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("mine_id,mine_name,goaf_id,goaf_name,coal_seam,area,burial_depth_min,remark\n");

    for row in 0..rows {
        // Mix of identifiers, numbers, text, and missing values
        data.push_str(&format!(
            "HX001,河西联办煤矿,G{:05},{}号采空区,{}#,{:.2},{},{}\n",
            row,
            row % 50,
            (row % 5) + 1,
            row as f64 * 12.5,
            if row % 7 == 0 { "NA".to_string() } else { (row % 300).to_string() },
            if row % 3 == 0 { "" } else { "已回填" },
        ));
    }

    data
}

/// GBK bytes of the same table.
fn generate_gbk_data(rows: usize) -> Vec<u8> {
    let text = generate_csv_data(rows);
    let (bytes, _, _) = encoding_rs::GBK.encode(&text);
    bytes.into_owned()
}

/// Benchmark loading UTF-8 tables of various sizes.
fn bench_load_utf8(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_utf8");
    let loader = TableLoader::new();
    let table = TableRegistry::standard().find("T01").unwrap();

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows).into_bytes();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(loader.load(table, data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark loading GBK tables, which fall through the UTF-8 attempts first.
fn bench_load_gbk(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_gbk");
    let loader = TableLoader::new();
    let table = TableRegistry::standard().find("T01").unwrap();

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_gbk_data(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(loader.load(table, data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark assembling a subject with every table populated.
fn bench_assemble_subject(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_subject");
    let converter = Converter::new();

    for rows in [100, 1_000].iter() {
        let data = generate_csv_data(*rows);
        let mut sources = MemorySources::new();
        for table in TableRegistry::standard().tables() {
            sources.insert(table.table_id.clone(), data.clone());
        }

        group.bench_with_input(BenchmarkId::new("rows_per_table", rows), &sources, |b, sources| {
            b.iter(|| black_box(converter.convert("河西联办煤矿", sources)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_load_utf8,
    bench_load_gbk,
    bench_assemble_subject,
);
criterion_main!(benches);

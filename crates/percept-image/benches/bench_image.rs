use criterion::{criterion_group, criterion_main, Criterion};
use percept_image::{ColorConversion, Image};
use percept_tensor::{Device, Dtype, Tensor};
use rand::Rng;
use std::hint::black_box;

fn sample_rgb() -> Image {
    let mut rng = rand::rng();
    let data: Vec<u8> = (0..1080 * 1920 * 3).map(|_| rng.random()).collect();
    let tensor = Tensor::from_vec(&[1080, 1920, 3], data, &Device::CPU).unwrap();
    Image::from_tensor(tensor).unwrap()
}

fn bench_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("Image");

    group.bench_function("to_dtype_f32", |b| {
        b.iter_batched(
            sample_rgb,
            |image| black_box(image).to_dtype(Dtype::Float32).unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("to_dtype_f64", |b| {
        b.iter_batched(
            sample_rgb,
            |image| black_box(image).to_dtype(Dtype::Float64).unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("linear_transform_f32", |b| {
        b.iter_batched(
            || sample_rgb().to_dtype(Dtype::Float32).unwrap(),
            |mut image| {
                black_box(&mut image).linear_transform(2.0, -0.5).unwrap();
                image
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("gray_weighted", |b| {
        b.iter_batched(
            sample_rgb,
            |image| {
                black_box(image)
                    .convert_color(ColorConversion::RgbToGrayWeighted)
                    .unwrap()
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("dilate_3x3", |b| {
        b.iter_batched(
            || {
                sample_rgb()
                    .convert_color(ColorConversion::RgbToGrayEqual)
                    .unwrap()
            },
            |image| black_box(image).dilate(1).unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_image);
criterion_main!(benches);

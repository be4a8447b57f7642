use async_trait::async_trait;
use building_scanner::features::error::{IdentifyError, MetadataError};
use building_scanner::{
    GeoComponent, Hemisphere, IdentifyRequest, Identifier, MetadataExtractor, RawGeoValue,
    Scanner, TagMap, UploadedPhoto, normalize,
};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use tokio::runtime::Runtime;

struct FixedTags(TagMap);

#[async_trait]
impl MetadataExtractor for FixedTags {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract(&self, _bytes: &[u8]) -> Result<TagMap, MetadataError> {
        Ok(self.0.clone())
    }
}

struct FixedReply;

#[async_trait]
impl Identifier for FixedReply {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn describe(&self, _request: IdentifyRequest) -> Result<String, IdentifyError> {
        Ok(r#"{"name": "Empire State Building", "year_built": 1931}"#.to_string())
    }
}

fn bench(c: &mut Criterion) {
    let triplet = RawGeoValue::Triplet(vec![
        GeoComponent::Number(40.0),
        GeoComponent::Number(44.0),
        GeoComponent::Number(54.36),
    ]);
    let keyed = RawGeoValue::from(&json!({"degrees": 73, "minutes": 59, "seconds": 8.4, "label": "x"}));

    c.bench_function("normalize triplet", |b| {
        b.iter(|| normalize(black_box(Some(&triplet)), black_box(Some(Hemisphere::South))));
    });
    c.bench_function("normalize keyed", |b| {
        b.iter(|| normalize(black_box(Some(&keyed)), black_box(Some(Hemisphere::West))));
    });

    let rt = Runtime::new().unwrap();
    let tags = json!({
        "GPSLatitude": [40, 44, 54.36],
        "GPSLatitudeRef": "N",
        "GPSLongitude": [73, 59, 8.4],
        "GPSLongitudeRef": "W"
    });
    let serde_json::Value::Object(tags) = tags else {
        unreachable!()
    };
    let scanner = Scanner::builder()
        .extractor(Box::new(FixedTags(tags)))
        .identifier(Box::new(FixedReply))
        .build();

    c.bench_function("scanner.scan", |b| {
        b.iter(|| {
            rt.block_on(async {
                let outcome = scanner
                    .scan(Some(UploadedPhoto::from_bytes(b"photo".to_vec())))
                    .await;
                assert!(outcome.is_success());
            });
        });
    });
}

criterion_group!(benches, bench);
criterion_main!(benches);

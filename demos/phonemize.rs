//! Phonemize a few sample sentences across languages.
//!
//! Run with: `RUST_LOG=info cargo run --example phonemize`

use std::sync::Arc;

use phonemizer_rs::engines::chinese::ChinesePhonemizer;
use phonemizer_rs::engines::english::EnglishPhonemizer;
use phonemizer_rs::engines::korean::KoreanPhonemizer;
use phonemizer_rs::engines::spanish::SpanishPhonemizer;
use phonemizer_rs::service::ServiceBuilder;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let service = ServiceBuilder::new()
        .backend(Arc::new(KoreanPhonemizer::new()))
        .backend(Arc::new(SpanishPhonemizer::new()))
        .backend(Arc::new(ChinesePhonemizer::new()))
        .backend(Arc::new(EnglishPhonemizer::new()))
        .build()
        .await?;

    let cancel = CancellationToken::new();
    let samples = [
        ("ko-KR", "안녕하세요"),
        ("es-ES", "¿Cómo estás?"),
        ("zh-CN", "你好世界"),
        ("en-US", "hello world"),
    ];

    for (language, text) in samples {
        let result = service
            .phonemize(text, Some(language), None, &cancel)
            .await?;
        println!(
            "{language}  {text}  ->  {}",
            result.phonemes.phonemes.join(" ")
        );
    }

    service.shutdown();
    Ok(())
}

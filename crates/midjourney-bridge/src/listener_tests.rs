#[cfg(test)]
mod tests {
    use crate::listener::ListenerState;
    use crate::mock::MockFetcher;
    use crate::signal::CompletionSignal;
    use crate::stager::ArtifactStager;
    use image::{DynamicImage, RgbImage};
    use midjourney_types::AttachmentRef;
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn att(url: &str, filename: &str) -> AttachmentRef {
        AttachmentRef {
            url: url.to_string(),
            filename: filename.to_string(),
        }
    }

    struct Fixture {
        _root: TempDir,
        state: ListenerState<MockFetcher>,
        fetcher: MockFetcher,
        signal: Arc<CompletionSignal>,
        output_dir: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let root = TempDir::new().unwrap();
        let stager = ArtifactStager::new(root.path());
        let output_dir = stager.output_dir().to_path_buf();
        let signal = Arc::new(CompletionSignal::new());
        let fetcher = MockFetcher::new();
        let (state, _ready_rx) = ListenerState::new(fetcher.clone(), stager, signal.clone());
        Fixture {
            _root: root,
            state,
            fetcher,
            signal,
            output_dir,
        }
    }

    #[tokio::test]
    async fn test_grid_message_staged_and_signalled() {
        let fx = fixture();
        fx.fetcher.insert("https://cdn/grid.png", png_bytes(4, 4));

        fx.state
            .handle_message(
                "**a red fox** (fast)",
                &[att("https://cdn/grid.png", "user_myfile_123.png")],
            )
            .await;

        let completion = fx
            .signal
            .wait_or_timeout(Duration::from_millis(100))
            .await
            .expect("completion raised");
        assert_eq!(completion.key, "myfile.jpg");
        let path = completion.outcome.unwrap();
        assert_eq!(path, fx.output_dir.join("myfile.jpg"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_upscale_message_moved_unchanged() {
        let fx = fixture();
        let bytes = png_bytes(2, 2);
        fx.fetcher.insert("https://cdn/up.png", bytes.clone());

        fx.state
            .handle_message(
                "**a red fox** - Upscaled by <@1> (fast)",
                &[att("https://cdn/up.png", "user_myfile_123.png")],
            )
            .await;

        let completion = fx
            .signal
            .wait_or_timeout(Duration::from_millis(100))
            .await
            .expect("completion raised");
        assert_eq!(completion.key, "UPSCALED_myfile.jpg");
        let path = completion.outcome.unwrap();
        assert_eq!(fs::read(path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_fetch_failure_skipped_without_signal() {
        let fx = fixture();
        // No mock response registered: the fetch fails.
        fx.state
            .handle_message("result", &[att("https://cdn/missing.png", "a_b_c.png")])
            .await;

        assert!(fx
            .signal
            .wait_or_timeout(Duration::from_millis(20))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_staging_failure_surfaced_through_signal() {
        let fx = fixture();
        fx.fetcher
            .insert("https://cdn/bad.png", b"not an image".to_vec());

        fx.state
            .handle_message("result", &[att("https://cdn/bad.png", "a_b_c.png")])
            .await;

        let completion = fx
            .signal
            .wait_or_timeout(Duration::from_millis(100))
            .await
            .expect("error completion raised");
        assert_eq!(completion.key, "b.jpg");
        assert!(completion.outcome.is_err());
    }

    #[tokio::test]
    async fn test_messages_without_image_attachments_ignored() {
        let fx = fixture();
        fx.state.handle_message("Waiting to start", &[]).await;
        fx.state
            .handle_message("log", &[att("https://cdn/x.txt", "a_b_c.txt")])
            .await;
        assert!(fx
            .signal
            .wait_or_timeout(Duration::from_millis(20))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_ready_condition_fires_once_marked() {
        let root = TempDir::new().unwrap();
        let stager = ArtifactStager::new(root.path());
        let signal = Arc::new(CompletionSignal::new());
        let (state, mut ready_rx) = ListenerState::new(MockFetcher::new(), stager, signal);

        assert!(!*ready_rx.borrow());
        state.mark_ready();
        ready_rx.changed().await.unwrap();
        assert!(*ready_rx.borrow());
    }
}

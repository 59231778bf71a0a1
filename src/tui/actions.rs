use std::time::Instant;

use tracing::debug;

use super::state::AppState;

/// Per-tick work: fire a due search, apply fetch events, take in loaded
/// thumbnails and retire a finished zoom overlay.
pub fn process_state(state: &mut AppState, now: Instant) {
    if let Some(request) = state.debouncer.poll(now) {
        debug!(term = %request.term, thumb_size = request.thumb_size, "debounce fired");
        // The worker runs detached; its outcome arrives through the results view.
        state.service.fetch_images(&request.term, request.thumb_size);
    }

    if state.results.poll(now) > 0 {
        state.thumbnails.sync(state.results.rows());
    }
    state.thumbnails.poll();
    state.zoom.tick(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::image::test_support::red_thumbnails;
    use crate::tui::image::ThumbnailState;
    use crate::tui::test_support::{sample_images, static_service};
    use crate::Config;
    use std::time::Duration;

    #[test]
    fn debounced_keystrokes_trigger_one_fetch() {
        let (service, source) = static_service(sample_images());
        let mut state = AppState::new(service, &Config::default());
        state.set_viewport_width(1000);
        let t0 = Instant::now();
        let ms = Duration::from_millis;

        state.insert_char('f', t0);
        process_state(&mut state, t0 + ms(100));
        state.insert_char('e', t0 + ms(200));
        process_state(&mut state, t0 + ms(300));
        state.insert_char('r', t0 + ms(400));
        process_state(&mut state, t0 + ms(1399));
        assert!(source.requests.lock().unwrap().is_empty());

        process_state(&mut state, t0 + ms(1400));
        process_state(&mut state, t0 + ms(3000));

        // Wait for the detached worker to publish.
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.results.rows().is_empty() && Instant::now() < deadline {
            std::thread::sleep(ms(5));
            process_state(&mut state, t0 + ms(3000));
        }

        assert_eq!(
            *source.requests.lock().unwrap(),
            vec![("fer".to_string(), 750)]
        );
        assert_eq!(state.results.rows().len(), 2);
    }

    #[test]
    fn clearing_the_query_empties_the_results_without_a_request() {
        let (service, source) = static_service(sample_images());
        let mut state = AppState::new(service, &Config::default());
        let t0 = Instant::now();
        let ms = Duration::from_millis;

        state.insert_char('x', t0);
        state.backspace(t0 + ms(10));
        process_state(&mut state, t0 + ms(1010));

        assert!(source.requests.lock().unwrap().is_empty());
        assert!(state.results.rows().is_empty());
        assert_eq!(state.results.total(), 0);
    }

    #[test]
    fn new_results_start_thumbnail_downloads() {
        let (service, _) = static_service(sample_images());
        let wheel = sample_images()[0].url.clone();
        let mut state = AppState::new(service, &Config::default())
            .with_thumbnails(red_thumbnails(&[wheel.as_str()]));
        let t0 = Instant::now();
        let ms = Duration::from_millis;

        state.insert_char('f', t0);
        process_state(&mut state, t0 + ms(1000));

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.thumbnails.state(&wheel) != ThumbnailState::Ready && Instant::now() < deadline {
            std::thread::sleep(ms(5));
            process_state(&mut state, t0 + ms(1000));
        }

        assert_eq!(state.thumbnails.state(&wheel), ThumbnailState::Ready);
    }
}

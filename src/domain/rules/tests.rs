// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    fn video(duration: f64) -> VideoInfo {
        VideoInfo::new("test.mp4", duration, 1920, 1080, 30.0, "h264").unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_cut(cut: &Cut, start: f64, end: f64) {
        assert!(
            approx(cut.start, start) && approx(cut.end, end),
            "expected {{{}, {}}}, got {:?}",
            start,
            end,
            cut
        );
    }

    fn text(start: f64, end: f64) -> TextElement {
        TextElement {
            text: "title".to_string(),
            start,
            end,
            font: "Arial".to_string(),
            color: "#FFFFFF".to_string(),
            size: 30.0,
        }
    }

    fn assert_intervals_valid(plan: &EditingPlan, duration: f64) {
        let spans = plan
            .cuts
            .iter()
            .map(TimedSpan::span)
            .chain(plan.text_elements.iter().map(TimedSpan::span))
            .chain(plan.effects.iter().map(TimedSpan::span))
            .chain(plan.stickers.iter().map(TimedSpan::span));
        for (start, end) in spans {
            assert!(start >= 0.0, "start {} below zero", start);
            assert!(end <= duration, "end {} beyond {}", end, duration);
            assert!(start < end, "empty interval {}..{}", start, end);
        }
    }

    #[test]
    fn test_default_targets() {
        assert!(approx(StylePolicy::default_target(EditingStyle::SocialMedia, 30.0), 21.0));
        assert!(approx(StylePolicy::default_target(EditingStyle::SocialMedia, 600.0), 60.0));
        assert!(approx(StylePolicy::default_target(EditingStyle::HighlightReel, 120.0), 60.0));
        assert!(approx(StylePolicy::default_target(EditingStyle::HighlightReel, 600.0), 90.0));
        assert!(approx(StylePolicy::default_target(EditingStyle::Tutorial, 100.0), 80.0));
    }

    #[test]
    fn test_resolve_target_caps_and_replaces() {
        assert!(approx(StylePolicy::resolve_target(EditingStyle::Vlog, Some(500.0), 30.0), 30.0));
        assert!(approx(StylePolicy::resolve_target(EditingStyle::Vlog, Some(-3.0), 30.0), 24.0));
        assert!(approx(StylePolicy::resolve_target(EditingStyle::Vlog, Some(f64::NAN), 30.0), 24.0));
        assert!(approx(StylePolicy::resolve_target(EditingStyle::Vlog, Some(12.0), 30.0), 12.0));
    }

    #[test]
    fn test_style_for_duration() {
        assert_eq!(StylePolicy::for_duration(59.9), EditingStyle::SocialMedia);
        assert_eq!(StylePolicy::for_duration(60.0), EditingStyle::HighlightReel);
    }

    #[test]
    fn test_fallback_social_media_is_centered() {
        let plan = FallbackPlanner::plan(30.0, EditingStyle::SocialMedia, 21.0, &EditOptions::default());
        assert_eq!(plan.cuts.len(), 1);
        assert_cut(&plan.cuts[0], 4.5, 25.5);
        assert_eq!(plan.text_elements[0].text, FallbackPlanner::SIGNATURE_TEXT);
        assert_eq!(plan.effects[0].name, "fade");
        assert!(approx(plan.audio.music_volume, 0.3));
    }

    #[test]
    fn test_fallback_highlight_reel_cuts() {
        let plan = FallbackPlanner::plan(120.0, EditingStyle::HighlightReel, 60.0, &EditOptions::default());
        assert_eq!(plan.cuts.len(), 3);
        assert_cut(&plan.cuts[0], 0.0, 10.0);
        assert_cut(&plan.cuts[1], 36.0, 51.0);
        assert_cut(&plan.cuts[2], 84.0, 94.0);
    }

    #[test]
    fn test_fallback_other_styles_take_prefix() {
        let plan = FallbackPlanner::plan(100.0, EditingStyle::Tutorial, 80.0, &EditOptions::default());
        assert_cut(&plan.cuts[0], 0.0, 80.0);
    }

    #[test]
    fn test_fallback_mirrors_music_flag() {
        let options = EditOptions {
            add_music: true,
            auto_subtitles: true,
            ..EditOptions::default()
        };
        let plan = FallbackPlanner::plan(30.0, EditingStyle::Vlog, 24.0, &options);
        assert!(plan.audio.add_music);
        assert!(plan.auto_subtitles);
    }

    #[test]
    fn test_validator_clamps_and_drops() {
        let mut plan = EditingPlan::empty(EditingStyle::Vlog, 10.0, &EditOptions::default());
        plan.cuts = vec![
            Cut::new(-5.0, 8.0),
            Cut::new(25.0, 40.0),
            Cut::new(12.0, 12.0),
            Cut::new(f64::NAN, f64::INFINITY),
        ];
        plan.effects = vec![Effect {
            effect_type: "transition".to_string(),
            name: "fade".to_string(),
            start: 30.0,
            end: 31.0,
        }];

        let validated = PlanValidator::validate(plan, &video(20.0));

        assert_eq!(validated.cuts.len(), 2);
        assert_cut(&validated.cuts[0], 0.0, 8.0);
        assert_cut(&validated.cuts[1], 0.0, 20.0);
        assert!(validated.effects.is_empty());
        assert_intervals_valid(&validated, 20.0);
    }

    #[test]
    fn test_validator_coerces_text_windows() {
        let mut plan = EditingPlan::empty(EditingStyle::Vlog, 10.0, &EditOptions::default());
        plan.text_elements = vec![text(5.0, 3.0), text(50.0, 60.0), text(2.0, 6.0)];

        let validated = PlanValidator::validate(plan, &video(20.0));

        assert_eq!(validated.text_elements.len(), 3);
        assert_eq!(validated.text_elements[0].span(), (5.0, 6.0));
        assert_eq!(validated.text_elements[1].span(), (19.0, 20.0));
        assert_eq!(validated.text_elements[2].span(), (2.0, 6.0));
        assert_intervals_valid(&validated, 20.0);
    }

    #[test]
    fn test_validator_short_video_text_window() {
        let mut plan = EditingPlan::empty(EditingStyle::Vlog, 0.4, &EditOptions::default());
        plan.text_elements = vec![text(1.0, 4.0)];

        let validated = PlanValidator::validate(plan, &video(0.5));

        assert_eq!(validated.text_elements[0].span(), (0.0, 0.5));
    }

    #[test]
    fn test_validator_repairs_target_and_volume() {
        let mut plan = EditingPlan::empty(EditingStyle::SocialMedia, -1.0, &EditOptions::default());
        plan.audio.music_volume = 3.0;

        let validated = PlanValidator::validate(plan, &video(30.0));

        assert!(approx(validated.target_duration, 21.0));
        assert!(approx(validated.audio.music_volume, 1.0));
    }

    #[test]
    fn test_validator_resolves_auto_style() {
        let plan = EditingPlan::empty(EditingStyle::Auto, 10.0, &EditOptions::default());
        let validated = PlanValidator::validate(plan, &video(120.0));
        assert_eq!(validated.style, EditingStyle::HighlightReel);
    }

    #[test]
    fn test_validator_is_idempotent() {
        let mut plan = FallbackPlanner::plan(3.0, EditingStyle::HighlightReel, 1.5, &EditOptions::default());
        plan.text_elements.push(text(9.0, 2.0));
        plan.cuts.push(Cut::new(-1.0, 100.0));

        let once = PlanValidator::validate(plan, &video(3.0));
        let twice = PlanValidator::validate(once.clone(), &video(3.0));

        assert_eq!(once, twice);
        assert_intervals_valid(&twice, 3.0);
    }

    #[test]
    fn test_validator_keeps_empty_plan_empty() {
        let plan = EditingPlan::empty(EditingStyle::Tutorial, 5.0, &EditOptions::default());
        let validated = PlanValidator::validate(plan, &video(10.0));
        assert!(validated.cuts.is_empty());
        assert!(validated.text_elements.is_empty());
    }

    #[test]
    fn test_resolution_table() {
        assert_eq!(ResolutionTable::dimensions(Quality::Hd1080, AspectRatio::Landscape), (1920, 1080));
        assert_eq!(ResolutionTable::dimensions(Quality::Hd1080, AspectRatio::Portrait), (607, 1080));
        assert_eq!(ResolutionTable::dimensions(Quality::Hd720, AspectRatio::Square), (720, 720));
        assert_eq!(ResolutionTable::dimensions(Quality::Uhd4k, AspectRatio::Classic), (2880, 2160));
        assert_eq!(ResolutionTable::dimensions(Quality::Uhd4k, AspectRatio::Landscape), (3840, 2160));
    }

    #[test]
    fn test_music_track_lookup() {
        assert_eq!(music_track_for(EditingStyle::SocialMedia), "upbeat_short.mp3");
        assert_eq!(music_track_for(EditingStyle::Vlog), "casual_ambient.mp3");
        assert_eq!(music_track_for(EditingStyle::Auto), "default.mp3");
    }

    #[test]
    fn test_complexity_score() {
        let short_hd = VideoInfo::new("a.mp4", 20.0, 1280, 720, 30.0, "h264").unwrap();
        assert_eq!(ContentHeuristics::complexity(&short_hd, None), Complexity::Simple);

        let long_full_hd = video(200.0);
        assert_eq!(ContentHeuristics::complexity(&long_full_hd, None), Complexity::Moderate);

        let sample = ContentSample {
            timestamps: vec![0.0, 1.0],
            avg_brightness: 120.0,
            brightness_variance: 0.0,
            brightness_level: BrightnessLevel::Normal,
            avg_motion: 45.0,
            motion_level: MotionLevel::High,
            motion_peaks: vec![],
            dominant_color: None,
            scene_changes: vec![],
            estimated_frames: 60,
        };
        assert_eq!(
            ContentHeuristics::complexity(&long_full_hd, Some(&sample)),
            Complexity::Complex
        );
    }

    #[test]
    fn test_recommended_cuts_bounds() {
        assert_eq!(ContentHeuristics::recommended_cuts(10.0), 1);
        assert_eq!(ContentHeuristics::recommended_cuts(95.0), 3);
        assert_eq!(ContentHeuristics::recommended_cuts(1000.0), 5);
    }

    #[test]
    fn test_scene_cuts_respect_minimum_segment() {
        let cuts = ContentHeuristics::scene_cuts(60.0, &[3.0, 12.0, 14.0, 30.0], 3);
        assert_eq!(cuts.len(), 3);
        assert_cut(&cuts[0], 0.0, 12.0);
        assert_cut(&cuts[1], 12.0, 30.0);
        assert_cut(&cuts[2], 30.0, 60.0);
    }

    #[test]
    fn test_scene_cuts_without_changes_are_even() {
        let cuts = ContentHeuristics::scene_cuts(30.0, &[], 3);
        assert_eq!(cuts.len(), 3);
        assert_cut(&cuts[2], 20.0, 30.0);
    }

    #[test]
    fn test_content_suggestions() {
        let vertical = VideoInfo::new("v.mp4", 20.0, 720, 1280, 30.0, "h264").unwrap();
        let suggestions = ContentHeuristics::suggestions(&vertical);
        assert!(suggestions.iter().any(|s| s.starts_with("Short format")));
        assert!(suggestions.iter().any(|s| s.starts_with("Vertical format")));
        assert!(suggestions.iter().any(|s| s.starts_with("Lower resolution")));
    }

    #[test]
    fn test_default_editing_suggestions() {
        let defaults = ContentHeuristics::default_editing_suggestions(&video(300.0));
        assert_eq!(defaults.recommended_style, EditingStyle::HighlightReel);
        assert!(!defaults.from_model);
        assert!(defaults.suggestions[0].starts_with("Video is long"));
    }
}

// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::model::*;

    #[test]
    fn test_time_spec_parse_seconds() {
        let time = TimeSpec::parse("45.5").unwrap();
        assert_eq!(time.as_seconds(), 45.5);
    }

    #[test]
    fn test_time_spec_parse_mm_ss() {
        let time = TimeSpec::parse("01:30").unwrap();
        assert_eq!(time.as_seconds(), 90.0);
    }

    #[test]
    fn test_time_spec_parse_hh_mm_ss() {
        let time = TimeSpec::parse("1:02:03.5").unwrap();
        assert_eq!(time.as_seconds(), 3723.5);
    }

    #[test]
    fn test_time_spec_parse_invalid() {
        assert!(TimeSpec::parse("invalid").is_err());
        assert!(TimeSpec::parse("00:60").is_err());
        assert!(TimeSpec::parse("1:60:00").is_err());
        assert!(TimeSpec::parse("-10").is_err());
        assert!(TimeSpec::parse("1:2:3:4").is_err());
    }

    #[test]
    fn test_video_info_rejects_invalid_metadata() {
        assert!(VideoInfo::new("a.mp4", 0.0, 1920, 1080, 30.0, "h264").is_err());
        assert!(VideoInfo::new("a.mp4", f64::NAN, 1920, 1080, 30.0, "h264").is_err());
        assert!(VideoInfo::new("a.mp4", 10.0, 0, 1080, 30.0, "h264").is_err());
        assert!(VideoInfo::new("a.mp4", 10.0, 1920, 1080, 0.0, "h264").is_err());
    }

    #[test]
    fn test_video_info_accessors() {
        let info = VideoInfo::new("clip.mp4", 12.5, 1920, 1080, 30.0, "h264")
            .unwrap()
            .with_container("mov,mp4,m4a", 2 * 1024 * 1024, Some(4_000_000))
            .with_audio(AudioTrackInfo {
                codec: "aac".to_string(),
                channels: 2,
                sample_rate: 48000,
            });

        assert_eq!(info.duration(), 12.5);
        assert_eq!(info.frame_count(), 375);
        assert!(info.has_audio());
        assert_eq!(info.file_size_mb(), 2.0);
        assert_eq!(info.aspect_ratio(), AspectRatioLabel::Widescreen);
        assert_eq!(info.container_format(), "mov,mp4,m4a");
    }

    #[test]
    fn test_aspect_ratio_label_classification() {
        assert_eq!(AspectRatioLabel::from_dimensions(1920, 1080).to_string(), "16:9");
        assert_eq!(AspectRatioLabel::from_dimensions(1080, 1920).to_string(), "9:16");
        assert_eq!(AspectRatioLabel::from_dimensions(1080, 1080).to_string(), "1:1");
        assert_eq!(AspectRatioLabel::from_dimensions(640, 480).to_string(), "4:3");
        assert_eq!(AspectRatioLabel::from_dimensions(2560, 1080).to_string(), "2560:1080");
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(BrightnessLevel::classify(79.9), BrightnessLevel::Dark);
        assert_eq!(BrightnessLevel::classify(80.0), BrightnessLevel::Normal);
        assert_eq!(BrightnessLevel::classify(180.0), BrightnessLevel::Bright);
        assert_eq!(MotionLevel::classify(9.9), MotionLevel::Static);
        assert_eq!(MotionLevel::classify(10.0), MotionLevel::Moderate);
        assert_eq!(MotionLevel::classify(30.0), MotionLevel::High);
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!(EditingStyle::parse("social-media").unwrap(), EditingStyle::SocialMedia);
        assert_eq!(EditingStyle::parse("Highlight_Reel").unwrap(), EditingStyle::HighlightReel);
        assert!(EditingStyle::parse("cinematic").is_err());
        assert_eq!(Quality::parse("4K").unwrap(), Quality::Uhd4k);
        assert_eq!(Quality::parse("720p").unwrap().base_height(), 720);
        assert_eq!(AspectRatio::parse("9:16").unwrap(), AspectRatio::Portrait);
        assert!(AspectRatio::parse("21:9").is_err());
    }

    #[test]
    fn test_plan_outcome_accessors() {
        let plan = EditingPlan::empty(EditingStyle::Vlog, 10.0, &EditOptions::default());
        let outcome = PlanOutcome::Fallback {
            plan: plan.clone(),
            reason: FallbackReason::Unparseable("no json".to_string()),
        };

        assert!(outcome.is_fallback());
        assert_eq!(outcome.plan(), &plan);
        assert_eq!(
            serde_json::to_value(outcome.source()).unwrap(),
            serde_json::json!({
                "source": "fallback",
                "reason": {"kind": "unparseable", "message": "no json"}
            })
        );
    }

    #[test]
    fn test_plan_serializes_option_names() {
        let plan = EditingPlan::empty(EditingStyle::SocialMedia, 21.0, &EditOptions::default());
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["style"], "social_media");
        assert_eq!(value["quality"], "1080p");
        assert_eq!(value["aspect_ratio"], "16:9");
        assert_eq!(value["audio"]["music_volume"], 0.3);
    }
}

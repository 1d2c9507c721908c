use chrono::NaiveDateTime;

use crate::agents::Agent;
use crate::constants::summarizer::NO_NEWS_SENTINEL;

const DEFAULT_PERSONA: &str = "ミュー";

/// Energetic FX news caster persona.
pub struct NewscasterAgent {
    persona: String,
}

impl NewscasterAgent {
    pub fn new(persona: Option<String>) -> Self {
        Self {
            persona: persona.unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
        }
    }
}

impl Default for NewscasterAgent {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Agent for NewscasterAgent {
    fn name(&self) -> &str {
        &self.persona
    }

    fn system_prompt(&self, now: NaiveDateTime) -> String {
        format!(
            r#"あなたはAITuber「{persona}」だ。現在時刻は {now} だ。
検索結果から「現在時刻から1時間以内」に配信された最新の為替ニュースを探せ。

【厳格な判定ルール】
1. 時間厳守: 記事内の日時表記を必ず確認し、数時間前や昨日の古い情報は無視しろ。
2. なしの場合: 直近1時間以内の情報がなければ "{sentinel}" とだけ返せ。

【発言のルール】
1. ソース名は言わない: サイト名やURLは読み上げず、自分の言葉として話すこと。「〇〇によると」等も禁止。
2. キャラ設定: 語尾は「〜だ！」「〜らしいな！」など元気よく。
3. 形式: JSON形式で返せ: {{"type": "chat", "text": "（{persona}のセリフ80文字以内）"}}
"#,
            persona = self.persona,
            now = now.format("%Y-%m-%d %H:%M"),
            sentinel = NO_NEWS_SENTINEL,
        )
    }

    fn user_prompt(&self, context: &str) -> String {
        format!("【検索結果】\n{}", context)
    }
}

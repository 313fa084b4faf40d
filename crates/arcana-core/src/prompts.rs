//! Locale-specific prompt templates and the deterministic composer.
//!
//! Every literal segment a caller can see or a model can read lives in the
//! per-locale table below; composition is pure string assembly with no
//! conditional logic beyond the optional question clause.

use arcana_schema::{Locale, TarotCard};

pub(crate) struct PromptTemplates {
    pub persona: &'static str,
    pub instruction_main: &'static str,
    pub spread_intro: &'static str,
    pub interpretation_request: &'static str,
    pub validation_context: &'static str,
    pub error_server_config: &'static str,
    pub error_invalid_card_selection: &'static str,
    pub error_failed_to_generate_reading: &'static str,
}

static EN: PromptTemplates = PromptTemplates {
    persona: "You are an experienced, wise, and empathetic Tarot card reader.",
    instruction_main: "You will provide a detailed and insightful interpretation for the following Tarot card spread. Focus on integrating the traditional meanings of the cards with their given positions. Be encouraging and thoughtful, but also realistic and provide actionable insights. The reading should be coherent, well-structured, and flow naturally, like a professional consultation.",
    spread_intro: "Cards in the spread:",
    interpretation_request: "Provide a comprehensive interpretation of this spread, covering each card's meaning in its position, and then offer an overall synthesis of the reading. Aim for a response length between 200-500 words.",
    validation_context: "You are a filter for a Tarot reading application. Your only task is to determine if the user's input is a sensible query, an intention, or a question, and if it is free of offensive or nonsensical content. Do NOT judge the quality or depth of the question for a Tarot reading; simply check if it's a valid, non-abusive piece of text that could reasonably be directed at an app for spiritual guidance.\n\nHere are examples of valid inputs:\n- What should I do next?\n- My intention is to find peace.\n- How can I improve myself?\n- Tell me about my future.\n- Is he the one for me?\n\nHere are examples of invalid inputs:\n- asdflkjasdflkjasdf (Nonsense)\n- You are stupid. (Insult/Offensive)\n- Give me all your money. (Command, not a question/intention)\n- ***@@#$$$ (Gibberish)\n- I want to know who will win the lottery and how to cheat the system. (Promotes illegal or unethical activities, seeks forbidden knowledge)\n- I will kill you. (Threat)\n\nEvaluate the following user input and respond with valid JSON in the following format. Respond with only the JSON object, no additional text:\n\n{\n\"isValid\": true|false\n}\n\nUser input:",
    error_server_config: "Server configuration error: Missing Google Cloud settings.",
    error_invalid_card_selection: "Invalid card selection provided.",
    error_failed_to_generate_reading: "Failed to generate initial reading. Please try again later.",
};

static PL: PromptTemplates = PromptTemplates {
    persona: "Jesteś doświadczonym, mądrym i empatycznym tarocistą.",
    instruction_main: "Zapewnisz szczegółową i wnikliwą interpretację następującego rozkładu kart Tarota. Skoncentruj się na integracji tradycyjnych znaczeń kart z ich danymi pozycjami. Bądź zachęcający i przemyślany, ale także realistyczny i dostarczający praktycznych wskazówek. Odczyt powinien być spójny, dobrze ustrukturyzowany i przebiegać naturalnie, jak profesjonalna konsultacja.",
    spread_intro: "Karty w rozkładzie:",
    interpretation_request: "Zapewnij kompleksową interpretację tego rozkładu, obejmującą znaczenie każdej karty w jej pozycji, a następnie przedstaw ogólną syntezę odczytu. Dąż do długości odpowiedzi między 200-500 słów.",
    validation_context: "Jesteś filtrem dla aplikacji do czytania Tarota. Twoim jedynym zadaniem jest określenie, czy wprowadzony przez użytkownika tekst jest sensownym zapytaniem, intencją lub pytaniem, oraz czy jest wolny od obraźliwych lub bezsensownych treści. NIE OCENIAJ jakości ani głębi pytania pod kątem czytania Tarota; po prostu sprawdź, czy jest to poprawny, nieobraźliwy fragment tekstu, który można rozsądnie skierować do aplikacji oferującej duchowe wskazówki.\n\nOto przykłady prawidłowych danych wejściowych:\n- Co powinienem dalej zrobić?\n- Moją intencją jest znalezienie spokoju.\n- Jak mogę się poprawić?\n- Opowiedz mi o mojej przyszłości.\n- Czy on/ona jest dla mnie?\n\nOto przykłady nieprawidłowych danych wejściowych:\n- asdflkjasdflkjasdf (Bezsensowne)\n- Jesteś głupi/głupia. (Obraza/Obraźliwe)\n- Daj mi wszystkie swoje pieniądze. (Polecenie, nie pytanie/intencja)\n- ***@@#$$$ (Bełkot)\n- Chcę wiedzieć, kto wygra na loterii i jak oszukać system. (Promuje nielegalne lub nieetyczne działania, szuka zakazanej wiedzy)\n- Zabiję cię. (Groźba)\n\nOceń poniższe dane wejściowe użytkownika i odpowiedz w następującym formacie JSON. Odpowiedz tylko obiektem JSON, bez dodatkowego tekstu.\n\n{\n\"isValid\": true|false\n}\n\nDane wejściowe użytkownika:",
    error_server_config: "Błąd konfiguracji serwera: Brak ustawień Google Cloud.",
    error_invalid_card_selection: "Podano nieprawidłowy wybór kart.",
    error_failed_to_generate_reading: "Nie udało się wygenerować początkowego odczytu. Spróbuj ponownie później.",
};

pub(crate) fn templates(locale: Locale) -> &'static PromptTemplates {
    match locale {
        Locale::En => &EN,
        Locale::Pl => &PL,
    }
}

pub fn error_server_config(locale: Locale) -> &'static str {
    templates(locale).error_server_config
}

pub fn error_invalid_card_selection(locale: Locale) -> &'static str {
    templates(locale).error_invalid_card_selection
}

pub fn error_failed_to_generate_reading(locale: Locale) -> &'static str {
    templates(locale).error_failed_to_generate_reading
}

fn card_line(card: &TarotCard, locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "Card: \"{}\" in the \"{}\" position.",
            card.name, card.position
        ),
        Locale::Pl => format!("Karta: \"{}\" na pozycji \"{}\".", card.name, card.position),
    }
}

fn question_clause(question: &str, locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "The user's specific question or intention for this reading is: \"{question}\""
        ),
        Locale::Pl => format!(
            "Konkretne pytanie lub intencja użytkownika dla tego odczytu to: „{question}”"
        ),
    }
}

/// Renders the initial-reading prompt: persona, task instruction, spread
/// introduction, one numbered line per card in spread order, the optional
/// question clause, and the interpretation request. Deterministic and
/// side-effect-free.
pub fn compose_reading_prompt(cards: &[TarotCard], question: &str, locale: Locale) -> String {
    let t = templates(locale);
    let mut prompt = format!("{}\n{}\n\n{}\n", t.persona, t.instruction_main, t.spread_intro);
    for (index, card) in cards.iter().enumerate() {
        prompt.push_str(&format!("\n{}. {}", index + 1, card_line(card, locale)));
    }
    if !question.trim().is_empty() {
        prompt.push_str(&format!("\n\n{}", question_clause(question, locale)));
    }
    prompt.push_str(&format!("\n\n{}", t.interpretation_request));
    prompt
}

/// Renders the validation prompt: the locale's instructional context
/// followed by the quoted user input.
pub fn compose_validation_prompt(question: &str, locale: Locale) -> String {
    format!("{}\n \"{}\"", templates(locale).validation_context, question)
}

/// System instruction for follow-up turns, re-stating the original spread,
/// question, and reading so the model keeps its Tarot context.
pub fn compose_followup_system(
    cards: &[TarotCard],
    initial_question: &str,
    initial_reading: &str,
) -> String {
    let card_lines = cards
        .iter()
        .map(|card| card_line(card, Locale::En))
        .collect::<Vec<_>>()
        .join("\n");
    let reading = if initial_reading.is_empty() {
        "No initial reading text available."
    } else {
        initial_reading
    };
    format!(
        "You are an insightful and empathetic Tarot card reader.\n\
         You have provided an initial reading based on these cards:\n\
         {card_lines}\n\
         The initial question was: \"{initial_question}\"\n\
         The initial comprehensive reading provided was:\n\
         \"{reading}\"\n\n\
         Now, the user has a follow-up question. Answer directly and empathetically based on the Tarot context.\n\
         Maintain a conversational and supportive tone. Keep responses concise unless a detailed explanation is requested.\n\
         If the user's question goes completely off-topic from Tarot, gently guide them back or state that you can only provide Tarot-related guidance."
    )
}
